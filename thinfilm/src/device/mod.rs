//! Layer stack description and its spatial discretisation

pub mod cross_section;

pub use cross_section::{locate_layer, CrossSection};

use crate::config::ConfigError;

/// One homogeneous layer of the device.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Material identifier, e.g. "ITO" or "P3HTPCBM_BHJ"
    pub name: String,

    /// Thickness in nanometers
    pub thickness: f64,
}

impl Layer {
    pub fn new(name: impl Into<String>, thickness: f64) -> Self {
        Self {
            name: name.into(),
            thickness,
        }
    }
}

/// Immutable ordered layer stack, light entering at layer 0.
///
/// Layer 0 is the incidence medium (the substrate) and always has zero
/// thickness in the coherent calculation, whatever was configured. A sweep
/// step never mutates a stack; it derives a new one with
/// [`Stack::with_thickness`].
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    layers: Vec<Layer>,
    thicknesses: Vec<f64>,
}

impl Stack {
    /// Validate and build a stack.
    ///
    /// # Errors
    ///
    /// * `ConfigError::TooFewLayers` - fewer than two layers
    /// * `ConfigError::InvalidThickness` - a negative or non-finite thickness
    pub fn new(mut layers: Vec<Layer>) -> Result<Self, ConfigError> {
        if layers.len() < 2 {
            return Err(ConfigError::TooFewLayers(layers.len()));
        }
        for (index, layer) in layers.iter().enumerate() {
            if !layer.thickness.is_finite() || layer.thickness < 0.0 {
                return Err(ConfigError::InvalidThickness {
                    index,
                    value: layer.thickness,
                });
            }
        }

        layers[0].thickness = 0.0;
        let thicknesses = layers.iter().map(|l| l.thickness).collect();
        Ok(Self {
            layers,
            thicknesses,
        })
    }

    /// Build a stack from parallel name and thickness lists.
    pub fn from_parts<S: AsRef<str>>(names: &[S], thicknesses: &[f64]) -> Result<Self, ConfigError> {
        if names.len() != thicknesses.len() {
            return Err(ConfigError::ThicknessCountMismatch {
                layers: names.len(),
                thicknesses: thicknesses.len(),
            });
        }
        let layers = names
            .iter()
            .zip(thicknesses)
            .map(|(name, &thickness)| Layer::new(name.as_ref(), thickness))
            .collect();
        Self::new(layers)
    }

    /// A copy of this stack with one layer's thickness replaced.
    pub fn with_thickness(&self, index: usize, thickness: f64) -> Result<Self, ConfigError> {
        if index >= self.layers.len() {
            return Err(ConfigError::LayerIndexOutOfRange {
                role: "varied",
                index,
                count: self.layers.len(),
            });
        }
        let mut layers = self.layers.clone();
        layers[index].thickness = thickness;
        Self::new(layers)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.name.as_str())
    }

    /// Thicknesses in nm, layer 0 reported as zero
    pub fn thicknesses(&self) -> &[f64] {
        &self.thicknesses
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Index of the exit medium
    pub fn last_index(&self) -> usize {
        self.layers.len() - 1
    }

    pub fn total_thickness(&self) -> f64 {
        self.thicknesses.iter().sum()
    }
}
