//! JSON configuration of a device and its thickness sweep.
//!
//! ```json
//! {
//!   "layers": ["SiO2", "ITO", "PEDOT", "P3HTPCBM_BHJ", "Ca", "Al"],
//!   "thicknesses": [0, 110, 35, 220, 7, 200],
//!   "active_layer": 3,
//!   "varied_layer": 3,
//!   "wavelength": { "start": 350, "stop": 800, "step": 5 },
//!   "sweep": { "start": 0, "finish": 300, "step": 5 },
//!   "x_step": 5.0,
//!   "materials": { "directory": "matdata", "prefix": "nk_", "header_lines": 1, "spectrum": "AM15G.csv" }
//! }
//! ```
//!
//! Everything is validated once by [`DeviceConfig::plan`], before any
//! optical constant is loaded or any matrix is built.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::device::Stack;
use crate::grid::{SweepRange, WavelengthGrid};
use crate::materials::MaterialLibrary;
use crate::sweep::ThicknessSweep;

/// Problems with the user supplied configuration
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Stack needs at least 2 layers, got {0}")]
    TooFewLayers(usize),

    #[error("{layers} layers configured but {thicknesses} thicknesses")]
    ThicknessCountMismatch { layers: usize, thicknesses: usize },

    #[error("{role} layer index {index} is out of range for a {count}-layer stack")]
    LayerIndexOutOfRange {
        role: &'static str,
        index: usize,
        count: usize,
    },

    #[error("Stack has {stack} layers but optical constants were loaded for {constants}")]
    LayerCountMismatch { stack: usize, constants: usize },

    #[error("{role} layer cannot be the incidence medium (layer 0)")]
    IncidenceLayerSelected { role: &'static str },

    #[error("Thickness of layer {index} must be finite and non-negative, got {value}")]
    InvalidThickness { index: usize, value: f64 },

    #[error("{name} must be positive and finite, got {value}")]
    NonPositiveStep { name: &'static str, value: f64 },

    #[error("Malformed {name} range {start}..{end}")]
    MalformedRange {
        name: &'static str,
        start: f64,
        end: f64,
    },

    #[error("Wavelength grid is empty")]
    EmptyGrid,

    #[error("Wavelength grid is not strictly increasing at index {0}")]
    NotIncreasing(usize),

    #[error("Wavelength grid is not uniform at index {index}: step {found}, expected {expected}")]
    NonUniform {
        index: usize,
        found: f64,
        expected: f64,
    },

    #[error("Failed to read configuration '{path}': {message}")]
    Unreadable { path: PathBuf, message: String },

    #[error("Invalid configuration document: {0}")]
    Parse(String),
}

/// Wavelength range in nm, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WavelengthConfig {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

/// Thickness sweep of the varied layer in nm, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub start: f64,
    pub finish: f64,
    pub step: f64,
}

/// Where the optical constant and spectrum tables live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialsConfig {
    /// Directory holding `<prefix><layer>.csv` and the spectrum file
    pub directory: PathBuf,

    /// File name prefix of every material table
    pub prefix: String,

    /// Lines skipped at the top of every table
    pub header_lines: usize,

    /// Spectrum file name inside `directory`, irradiance in mW cm⁻² nm⁻¹
    pub spectrum: String,
}

impl Default for MaterialsConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("matdata"),
            prefix: "nk_".to_string(),
            header_lines: 1,
            spectrum: "AM15G.csv".to_string(),
        }
    }
}

impl MaterialsConfig {
    pub fn library(&self) -> MaterialLibrary {
        MaterialLibrary::new(&self.directory)
            .with_prefix(&self.prefix)
            .with_header_lines(self.header_lines)
    }
}

fn default_x_step() -> f64 {
    5.0
}

/// Complete description of one sweep job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Material names, incidence side first
    pub layers: Vec<String>,

    /// Thickness of each layer in nm; the first one is ignored
    pub thicknesses: Vec<f64>,

    /// Layer whose absorption is converted into photocurrent
    pub active_layer: usize,

    /// Layer whose thickness is swept
    pub varied_layer: usize,

    pub wavelength: WavelengthConfig,

    pub sweep: SweepConfig,

    /// Spacing of the cross-section samples in nm
    #[serde(default = "default_x_step")]
    pub x_step: f64,

    #[serde(default)]
    pub materials: MaterialsConfig,
}

impl Default for DeviceConfig {
    /// ITO / PEDOT:PSS / P3HT:PCBM / Ca / Al cell on glass
    fn default() -> Self {
        Self {
            layers: ["SiO2", "ITO", "PEDOT", "P3HTPCBM_BHJ", "Ca", "Al"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            thicknesses: vec![0.0, 110.0, 35.0, 220.0, 7.0, 200.0],
            active_layer: 3,
            varied_layer: 3,
            wavelength: WavelengthConfig {
                start: 350.0,
                stop: 800.0,
                step: 5.0,
            },
            sweep: SweepConfig {
                start: 0.0,
                finish: 300.0,
                step: 5.0,
            },
            x_step: default_x_step(),
            materials: MaterialsConfig::default(),
        }
    }
}

/// A validated configuration ready to run
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub sweep: ThicknessSweep,
    pub grid: WavelengthGrid,
}

impl DeviceConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate every setting and build the objects the sweep runs on.
    pub fn plan(&self) -> Result<SweepPlan, ConfigError> {
        let stack = Stack::from_parts(&self.layers, &self.thicknesses)?;
        let grid = WavelengthGrid::from_range(
            self.wavelength.start,
            self.wavelength.stop,
            self.wavelength.step,
        )?;
        let range = SweepRange::new(self.sweep.start, self.sweep.finish, self.sweep.step)?;
        let sweep = ThicknessSweep::new(
            stack,
            self.active_layer,
            self.varied_layer,
            range,
            self.x_step,
        )?;
        Ok(SweepPlan { sweep, grid })
    }
}
