//! Per-layer, per-wavelength optical inputs shared by all sweep steps.

use std::collections::HashMap;

use log::{debug, info};
use ndarray::{Array2, ArrayView1};
use num_complex::Complex64;

use super::{IndexProvider, MaterialError, MaterialLibrary, SpectrumTable};
use crate::config::ConfigError;
use crate::error::TmmError;
use crate::grid::WavelengthGrid;
use crate::optics::SubstrateTerms;
use crate::photocurrent::absorption_coefficient;

/// Refractive indices, spectrum and substrate terms sampled on one grid.
///
/// Built once before a sweep and only read afterwards. Nothing in here
/// depends on layer thicknesses.
#[derive(Debug, Clone)]
pub struct OpticalConstants {
    grid: WavelengthGrid,
    names: Vec<String>,
    /// layers × wavelengths
    indices: Array2<Complex64>,
    /// layers × wavelengths, cm⁻¹; the incidence medium is taken as lossless
    absorption: Array2<f64>,
    spectrum: Vec<f64>,
    substrate: Vec<SubstrateTerms>,
}

impl OpticalConstants {
    /// Assemble constants from already sampled data.
    ///
    /// # Arguments
    ///
    /// * `grid` - Working wavelength grid
    /// * `names` - Layer names, incidence side first
    /// * `indices` - Complex index per layer (rows) and wavelength (columns)
    /// * `spectrum` - Irradiance per grid wavelength in mW cm⁻² nm⁻¹
    ///
    /// # Errors
    ///
    /// `DataSource` for shape mismatches or non-finite values, and
    /// `InvalidOpticalConstant` when the substrate index is degenerate.
    pub fn new(
        grid: WavelengthGrid,
        names: Vec<String>,
        indices: Array2<Complex64>,
        spectrum: Vec<f64>,
    ) -> Result<Self, TmmError> {
        let (layers, wavelengths) = indices.dim();
        if layers < 2 {
            return Err(ConfigError::TooFewLayers(layers).into());
        }
        if names.len() != layers {
            return Err(MaterialError::ShapeMismatch {
                what: "layer names",
                expected: layers,
                found: names.len(),
            }
            .into());
        }
        if wavelengths != grid.len() {
            return Err(MaterialError::ShapeMismatch {
                what: "refractive index columns",
                expected: grid.len(),
                found: wavelengths,
            }
            .into());
        }
        if spectrum.len() != grid.len() {
            return Err(MaterialError::ShapeMismatch {
                what: "spectrum samples",
                expected: grid.len(),
                found: spectrum.len(),
            }
            .into());
        }

        for (layer, row) in indices.rows().into_iter().enumerate() {
            if let Some(index) = row.iter().position(|n| !n.is_finite()) {
                return Err(MaterialError::NonFinite {
                    what: format!("refractive index of {}", names[layer]),
                    index,
                }
                .into());
            }
        }
        if let Some(index) = spectrum.iter().position(|e| !e.is_finite()) {
            return Err(MaterialError::NonFinite {
                what: "spectrum".to_string(),
                index,
            }
            .into());
        }

        let substrate = indices
            .row(0)
            .iter()
            .map(|&n0| SubstrateTerms::from_index(n0))
            .collect::<Result<Vec<_>, _>>()?;

        let wl = grid.wavelengths();
        let absorption = Array2::from_shape_fn((layers, wavelengths), |(layer, j)| {
            if layer == 0 {
                0.0
            } else {
                absorption_coefficient(indices[[layer, j]], wl[j])
            }
        });

        Ok(Self {
            grid,
            names,
            indices,
            absorption,
            spectrum,
            substrate,
        })
    }

    /// Sample every provider and the spectrum onto `grid`.
    pub fn from_providers(
        grid: WavelengthGrid,
        providers: &[&dyn IndexProvider],
        spectrum: &SpectrumTable,
    ) -> Result<Self, TmmError> {
        let mut indices = Array2::zeros((providers.len(), grid.len()));
        for (layer, provider) in providers.iter().enumerate() {
            for (j, &wl) in grid.wavelengths().iter().enumerate() {
                indices[[layer, j]] = provider.refractive_index(wl)?;
            }
        }
        let samples = spectrum.resample(&grid)?;
        let names = providers.iter().map(|p| p.name().to_string()).collect();
        Self::new(grid, names, indices, samples)
    }

    /// Load the tables of every named layer plus the spectrum from `library`.
    ///
    /// A material used by several layers is read once.
    pub fn load<S: AsRef<str>>(
        library: &MaterialLibrary,
        layer_names: &[S],
        spectrum_file: &str,
        grid: WavelengthGrid,
    ) -> Result<Self, TmmError> {
        let mut tables = HashMap::new();
        for name in layer_names {
            let name = name.as_ref();
            if !tables.contains_key(name) {
                tables.insert(name.to_string(), library.load(name)?);
            }
        }
        let spectrum = library.load_spectrum(spectrum_file)?;

        let mut providers: Vec<&dyn IndexProvider> = Vec::with_capacity(layer_names.len());
        for name in layer_names {
            if let Some(table) = tables.get(name.as_ref()) {
                providers.push(table);
            }
        }

        info!(
            "Loaded {} materials for {} layers from {}",
            tables.len(),
            layer_names.len(),
            library.directory().display()
        );
        let constants = Self::from_providers(grid, &providers, &spectrum)?;
        debug!(
            "Optical constants sampled on {} wavelengths ({}..{} nm)",
            constants.grid.len(),
            constants.grid.first(),
            constants.grid.last()
        );
        Ok(constants)
    }

    pub fn grid(&self) -> &WavelengthGrid {
        &self.grid
    }

    pub fn layer_names(&self) -> &[String] {
        &self.names
    }

    pub fn layer_count(&self) -> usize {
        self.names.len()
    }

    /// Index of every layer at grid wavelength `j`
    pub fn indices_at(&self, j: usize) -> ArrayView1<'_, Complex64> {
        self.indices.column(j)
    }

    pub fn index(&self, layer: usize, j: usize) -> Complex64 {
        self.indices[[layer, j]]
    }

    /// Absorption coefficient in cm⁻¹
    pub fn absorption(&self, layer: usize, j: usize) -> f64 {
        self.absorption[[layer, j]]
    }

    /// Irradiance per grid wavelength, mW cm⁻² nm⁻¹
    pub fn spectrum(&self) -> &[f64] {
        &self.spectrum
    }

    pub fn substrate(&self, j: usize) -> &SubstrateTerms {
        &self.substrate[j]
    }
}
