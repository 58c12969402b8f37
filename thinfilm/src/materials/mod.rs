//! Optical constants and illumination spectrum
//!
//! Tabulated `(wavelength, n, k)` and `(wavelength, irradiance)` data are
//! read from CSV files, sorted by wavelength and linearly interpolated onto
//! the working [`WavelengthGrid`](crate::grid::WavelengthGrid). The result
//! is bundled into [`OpticalConstants`], the read-only input shared by every
//! sweep step.

use std::path::PathBuf;

use num_complex::Complex64;
use thiserror::Error;

pub mod constants;
pub mod library;
pub mod table;

pub use constants::OpticalConstants;
pub use library::MaterialLibrary;
pub use table::{NkTable, SpectrumTable};

/// Errors from loading or sampling material and spectrum data
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MaterialError {
    #[error("Failed to read '{path}': {message}")]
    Io { path: PathBuf, message: String },

    #[error("'{path}' line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("'{path}' has {rows} data rows, need at least 2")]
    TooFewRows { path: PathBuf, rows: usize },

    #[error("'{path}' lists wavelength {wavelength_nm} nm more than once")]
    DuplicateWavelength { path: PathBuf, wavelength_nm: f64 },

    #[error("Wavelength {wavelength_nm} nm is outside the data range [{min}, {max}] nm of {material}")]
    OutOfRange {
        material: String,
        wavelength_nm: f64,
        min: f64,
        max: f64,
    },

    #[error("{what}: expected {expected} values, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{what} contains a non-finite value at wavelength index {index}")]
    NonFinite { what: String, index: usize },
}

/// Source of a complex refractive index as a function of wavelength.
pub trait IndexProvider: Send + Sync {
    /// Human-readable name of this material.
    fn name(&self) -> &str;

    /// Wavelength range over which data is available (nm).
    fn wavelength_range(&self) -> (f64, f64);

    /// Complex refractive index `n + ik` at a given wavelength.
    fn refractive_index(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError>;
}
