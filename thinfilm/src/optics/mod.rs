//! Transfer-matrix optics at normal incidence
//!
//! Everything here works on a single wavelength at a time: the index slice
//! holds one complex refractive index per layer, ordered from the incidence
//! medium (layer 0) to the exit medium (last layer).

use num_complex::Complex64;
use thiserror::Error;

pub mod field;
pub mod stack;
pub mod substrate;
pub mod transfer;

pub use field::{LayerFieldSolver, PartialProducts};
pub use stack::{solve_coherent, StackSolution};
pub use substrate::SubstrateTerms;
pub use transfer::TransferMatrix;

/// Smallest field denominator modulus accepted before the layer is treated
/// as singular at that wavelength.
pub const SINGULARITY_THRESHOLD: f64 = 1e-12;

/// Tolerance on reflectance leaving `[0, 1]` before it is reported
pub const REFLECTANCE_TOLERANCE: f64 = 1e-9;

/// Errors raised by the optical solvers
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OpticsError {
    #[error("Degenerate interface between n1 = {n1} and n2 = {n2}")]
    DegenerateInterface { n1: Complex64, n2: Complex64 },

    #[error("Unphysical reflectance {reflectance} at {wavelength_nm} nm")]
    UnphysicalReflectance { wavelength_nm: f64, reflectance: f64 },

    #[error("Stack needs at least 2 layers, got {0}")]
    TooFewLayers(usize),

    #[error(
        "Field denominator |{denominator:e}| is singular at {wavelength_nm} nm in layer {layer} ({layer_thickness_nm} nm thick)"
    )]
    Singularity {
        wavelength_nm: f64,
        layer: usize,
        layer_thickness_nm: f64,
        denominator: f64,
    },
}
