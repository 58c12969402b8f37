//! Crate-level error type

use thiserror::Error;

use crate::config::ConfigError;
use crate::materials::MaterialError;
use crate::optics::OpticsError;

/// Every failure the pipeline can surface.
///
/// Configuration and data source problems are detected before the sweep
/// starts. Numerical singularities are normally recorded per sweep step
/// instead of being raised, see [`crate::simulation::Singularity`].
#[derive(Debug, Error)]
pub enum TmmError {
    #[error("Invalid optical constant: {0}")]
    InvalidOpticalConstant(String),

    #[error(
        "Numerical singularity at {wavelength_nm} nm in layer {layer} ({thickness_nm} nm thick)"
    )]
    NumericalSingularity {
        wavelength_nm: f64,
        thickness_nm: f64,
        layer: usize,
    },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Data source error: {0}")]
    DataSource(MaterialError),

    #[error("Sweep cancelled")]
    Cancelled,
}

impl From<MaterialError> for TmmError {
    fn from(err: MaterialError) -> Self {
        match err {
            // Tables that do not cover the grid are an optical constant problem
            MaterialError::OutOfRange { .. } => TmmError::InvalidOpticalConstant(err.to_string()),
            other => TmmError::DataSource(other),
        }
    }
}

impl From<OpticsError> for TmmError {
    fn from(err: OpticsError) -> Self {
        match err {
            OpticsError::Singularity {
                wavelength_nm,
                layer,
                layer_thickness_nm,
                ..
            } => TmmError::NumericalSingularity {
                wavelength_nm,
                thickness_nm: layer_thickness_nm,
                layer,
            },
            OpticsError::TooFewLayers(count) => {
                TmmError::Configuration(ConfigError::TooFewLayers(count))
            }
            other => TmmError::InvalidOpticalConstant(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use std::path::PathBuf;

    #[test]
    fn test_out_of_range_table_maps_to_optical_constant() {
        let err: TmmError = MaterialError::OutOfRange {
            material: "ITO".to_string(),
            wavelength_nm: 300.0,
            min: 350.0,
            max: 900.0,
        }
        .into();
        assert!(matches!(err, TmmError::InvalidOpticalConstant(_)));
    }

    #[test]
    fn test_missing_file_maps_to_data_source() {
        let err: TmmError = MaterialError::Io {
            path: PathBuf::from("matdata/nk_ITO.csv"),
            message: "No such file".to_string(),
        }
        .into();
        assert!(matches!(err, TmmError::DataSource(_)));
    }

    #[test]
    fn test_degenerate_interface_maps_to_optical_constant() {
        let err: TmmError = OpticsError::DegenerateInterface {
            n1: Complex64::new(1.0, 0.0),
            n2: Complex64::new(-1.0, 0.0),
        }
        .into();
        assert!(matches!(err, TmmError::InvalidOpticalConstant(_)));
    }

    #[test]
    fn test_singularity_maps_to_numerical_singularity() {
        let err: TmmError = OpticsError::Singularity {
            wavelength_nm: 500.0,
            layer: 2,
            layer_thickness_nm: 35.0,
            denominator: 0.0,
        }
        .into();
        assert!(matches!(
            err,
            TmmError::NumericalSingularity { layer: 2, thickness_nm, wavelength_nm }
                if thickness_nm == 35.0 && wavelength_nm == 500.0
        ));
    }
}
