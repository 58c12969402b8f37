//! One complete optical pass over a fixed stack.
//!
//! For every grid wavelength: solve the coherent stack, apply the
//! incoherent substrate factor, reconstruct the field at every sample of
//! every layer behind the substrate, then turn the field in the active
//! layer into a generation profile and a short-circuit current.
//!
//! # Singularities
//!
//! When the field denominator of a layer vanishes at some wavelength the
//! samples of that layer get a zero field for that wavelength, so they add
//! nothing to absorption or current, and a [`Singularity`] is recorded.
//! The pass itself continues.

use log::{debug, warn};
use ndarray::{s, Array2, ArrayView2};
use num_complex::Complex64;

use crate::config::ConfigError;
use crate::device::{CrossSection, Stack};
use crate::error::TmmError;
use crate::materials::OpticalConstants;
use crate::optics::{solve_coherent, LayerFieldSolver, OpticsError};
use crate::photocurrent::{
    exciton_generation, integrate_wavelength, layer_absorptance, short_circuit_current,
};

/// A layer/wavelength combination whose field could not be reconstructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Singularity {
    pub wavelength_nm: f64,
    pub layer: usize,
    /// Thickness of the affected layer in nm
    pub layer_thickness_nm: f64,
    /// Samples whose field was set to zero
    pub samples: usize,
}

/// Everything computed by one pass.
#[derive(Debug, Clone)]
pub struct DeviceSolution {
    pub cross_section: CrossSection,

    /// Coherent stack reflectance per wavelength
    pub reflectance: Vec<f64>,

    /// Power transmittance into the exit medium per wavelength
    pub transmittance: Vec<f64>,

    /// Substrate field transmission factor T per wavelength
    pub field_transmission: Vec<f64>,

    /// Field amplitude, samples × wavelengths (zero in the incidence medium)
    pub field: Array2<Complex64>,

    /// Absorbed fraction of the incident power, layers × wavelengths
    pub absorptance: Array2<f64>,

    /// Exciton generation `Gx` at each active-layer sample, cm⁻³ s⁻¹
    pub generation: Vec<f64>,

    /// Short-circuit current density in mA cm⁻²
    pub jsc: f64,

    pub singularities: Vec<Singularity>,
}

impl DeviceSolution {
    /// Field rows of the samples inside `layer`
    pub fn layer_field(&self, layer: usize) -> ArrayView2<'_, Complex64> {
        let range = self.cross_section.samples_in(layer);
        self.field.slice(s![range, ..])
    }
}

/// Runs the optical pipeline for arbitrary stacks sharing one set of constants.
#[derive(Debug, Clone, Copy)]
pub struct DeviceSimulation<'a> {
    constants: &'a OpticalConstants,
    active_layer: usize,
    x_step: f64,
}

impl<'a> DeviceSimulation<'a> {
    /// # Arguments
    ///
    /// * `constants` - Optical inputs, one row per stack layer
    /// * `active_layer` - Layer converted into photocurrent (≥ 1)
    /// * `x_step` - Cross-section sample spacing in nm
    pub fn new(
        constants: &'a OpticalConstants,
        active_layer: usize,
        x_step: f64,
    ) -> Result<Self, ConfigError> {
        let count = constants.layer_count();
        if active_layer >= count {
            return Err(ConfigError::LayerIndexOutOfRange {
                role: "active",
                index: active_layer,
                count,
            });
        }
        if active_layer == 0 {
            return Err(ConfigError::IncidenceLayerSelected { role: "active" });
        }
        if !x_step.is_finite() || x_step <= 0.0 {
            return Err(ConfigError::NonPositiveStep {
                name: "spatial step",
                value: x_step,
            });
        }
        Ok(Self {
            constants,
            active_layer,
            x_step,
        })
    }

    pub fn constants(&self) -> &OpticalConstants {
        self.constants
    }

    pub fn active_layer(&self) -> usize {
        self.active_layer
    }

    /// Run the full pass for `stack`.
    ///
    /// # Errors
    ///
    /// * `Configuration` - the stack does not match the constants
    /// * `InvalidOpticalConstant` - a degenerate interface or unphysical reflectance
    pub fn run(&self, stack: &Stack) -> Result<DeviceSolution, TmmError> {
        let constants = self.constants;
        if stack.len() != constants.layer_count() {
            return Err(ConfigError::LayerCountMismatch {
                stack: stack.len(),
                constants: constants.layer_count(),
            }
            .into());
        }

        let section = CrossSection::new(stack, self.x_step)?;
        let grid = constants.grid();
        let thicknesses = stack.thicknesses();
        let wavelength_count = grid.len();

        let mut reflectance = Vec::with_capacity(wavelength_count);
        let mut transmittance = Vec::with_capacity(wavelength_count);
        let mut field_transmission = Vec::with_capacity(wavelength_count);
        let mut field = Array2::<Complex64>::zeros((section.len(), wavelength_count));
        let mut singularities = Vec::new();

        for (j, &wl) in grid.wavelengths().iter().enumerate() {
            let indices = constants.indices_at(j);
            let solution = solve_coherent(indices, thicknesses, wl)?;
            let t = constants
                .substrate(j)
                .field_transmission(solution.reflectance, wl)?;

            reflectance.push(solution.reflectance);
            transmittance.push(solution.transmittance);
            field_transmission.push(t);

            for layer in 1..stack.len() {
                let range = section.samples_in(layer);
                if range.is_empty() {
                    continue;
                }

                let solver = match LayerFieldSolver::new(indices, thicknesses, wl, layer, t) {
                    Ok(solver) => Some(solver),
                    Err(OpticsError::Singularity { .. }) => None,
                    Err(other) => return Err(other.into()),
                };

                let amplitudes: Option<Vec<Complex64>> = solver.and_then(|solver| {
                    let values: Vec<Complex64> = section
                        .local_depths(layer)
                        .map(|(_, x)| solver.amplitude(x))
                        .collect();
                    values.iter().all(|e| e.is_finite()).then_some(values)
                });

                match amplitudes {
                    Some(values) => {
                        for (k, value) in range.zip(values) {
                            field[[k, j]] = value;
                        }
                    }
                    None => {
                        warn!(
                            "Field singular at {} nm in layer {} ({} nm thick), {} samples zeroed",
                            wl,
                            layer,
                            thicknesses[layer],
                            range.len()
                        );
                        singularities.push(Singularity {
                            wavelength_nm: wl,
                            layer,
                            layer_thickness_nm: thicknesses[layer],
                            samples: range.len(),
                        });
                    }
                }
            }
        }

        let mut absorptance = Array2::<f64>::zeros((stack.len(), wavelength_count));
        for layer in 1..stack.len() {
            let rows = field.slice(s![section.samples_in(layer), ..]);
            let absorbed = layer_absorptance(rows, constants, layer, self.x_step);
            for (j, a) in absorbed.into_iter().enumerate() {
                absorptance[[layer, j]] = a;
            }
        }

        let active_rows = field.slice(s![section.samples_in(self.active_layer), ..]);
        let gxl = exciton_generation(active_rows, constants, self.active_layer);
        let generation = integrate_wavelength(gxl.view(), grid.step());
        let jsc = short_circuit_current(&generation, self.x_step);

        debug!(
            "Pass over {:.1} nm stack: {} samples, {} wavelengths, Jsc {:.4} mA/cm²",
            stack.total_thickness(),
            section.len(),
            wavelength_count,
            jsc
        );

        Ok(DeviceSolution {
            cross_section: section,
            reflectance,
            transmittance,
            field_transmission,
            field,
            absorptance,
            generation,
            jsc,
            singularities,
        })
    }
}
