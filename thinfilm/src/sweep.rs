//! Thickness sweep of one layer.
//!
//! Every sweep value gets its own immutable [`Stack`] and a full
//! [`DeviceSimulation`] pass. Steps are independent, so they run on the
//! rayon pool; results come back in sweep order regardless of scheduling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info};
use rayon::prelude::*;

use crate::config::ConfigError;
use crate::device::Stack;
use crate::error::TmmError;
use crate::grid::SweepRange;
use crate::materials::OpticalConstants;
use crate::simulation::{DeviceSimulation, DeviceSolution, Singularity};

/// Shared flag used to stop a running sweep.
///
/// Clones observe the same flag. Each step checks it before starting; once
/// a step sees it set the sweep returns [`TmmError::Cancelled`]. A sweep
/// whose steps have all started is not affected.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Outcome of one sweep step
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    /// Thickness of the varied layer in nm
    pub thickness_nm: f64,

    /// Short-circuit current density in mA cm⁻²
    pub jsc: f64,

    pub singularities: Vec<Singularity>,
}

impl SweepPoint {
    pub fn is_regular(&self) -> bool {
        self.singularities.is_empty()
    }

    /// Jsc, or the first singularity met at this step as an error.
    pub fn require_regular(&self) -> Result<f64, TmmError> {
        match self.singularities.first() {
            None => Ok(self.jsc),
            Some(s) => Err(TmmError::NumericalSingularity {
                wavelength_nm: s.wavelength_nm,
                thickness_nm: s.layer_thickness_nm,
                layer: s.layer,
            }),
        }
    }
}

/// All points of a sweep, in sweep order.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    points: Vec<SweepPoint>,
}

impl SweepResult {
    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn thicknesses(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.thickness_nm).collect()
    }

    pub fn currents(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.jsc).collect()
    }

    /// Point with the largest Jsc; the earliest one wins ties.
    pub fn best(&self) -> Option<&SweepPoint> {
        self.points
            .iter()
            .fold(None, |best: Option<&SweepPoint>, p| match best {
                Some(b) if b.jsc >= p.jsc => Some(b),
                _ => Some(p),
            })
    }

    pub fn singularity_count(&self) -> usize {
        self.points.iter().map(|p| p.singularities.len()).sum()
    }
}

/// A validated sweep: base stack, layer roles, thickness range, sampling.
#[derive(Debug, Clone)]
pub struct ThicknessSweep {
    stack: Stack,
    active_layer: usize,
    varied_layer: usize,
    range: SweepRange,
    x_step: f64,
}

fn check_layer_role(role: &'static str, index: usize, count: usize) -> Result<(), ConfigError> {
    if index >= count {
        return Err(ConfigError::LayerIndexOutOfRange { role, index, count });
    }
    if index == 0 {
        return Err(ConfigError::IncidenceLayerSelected { role });
    }
    Ok(())
}

impl ThicknessSweep {
    /// # Arguments
    ///
    /// * `stack` - Base stack; the varied layer's thickness in it is ignored
    /// * `active_layer` - Layer converted into photocurrent
    /// * `varied_layer` - Layer whose thickness takes the values of `range`
    /// * `range` - Thickness values in nm
    /// * `x_step` - Cross-section sample spacing in nm
    pub fn new(
        stack: Stack,
        active_layer: usize,
        varied_layer: usize,
        range: SweepRange,
        x_step: f64,
    ) -> Result<Self, ConfigError> {
        check_layer_role("active", active_layer, stack.len())?;
        check_layer_role("varied", varied_layer, stack.len())?;
        if !x_step.is_finite() || x_step <= 0.0 {
            return Err(ConfigError::NonPositiveStep {
                name: "spatial step",
                value: x_step,
            });
        }
        Ok(Self {
            stack,
            active_layer,
            varied_layer,
            range,
            x_step,
        })
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn active_layer(&self) -> usize {
        self.active_layer
    }

    pub fn varied_layer(&self) -> usize {
        self.varied_layer
    }

    pub fn range(&self) -> &SweepRange {
        &self.range
    }

    pub fn x_step(&self) -> f64 {
        self.x_step
    }

    /// The stack simulated at one sweep value.
    pub fn stack_at(&self, thickness_nm: f64) -> Result<Stack, ConfigError> {
        self.stack.with_thickness(self.varied_layer, thickness_nm)
    }

    /// Full pass at a single thickness, keeping fields and absorptance.
    pub fn simulate(
        &self,
        constants: &OpticalConstants,
        thickness_nm: f64,
    ) -> Result<DeviceSolution, TmmError> {
        let simulation = DeviceSimulation::new(constants, self.active_layer, self.x_step)?;
        simulation.run(&self.stack_at(thickness_nm)?)
    }

    pub fn run(&self, constants: &OpticalConstants) -> Result<SweepResult, TmmError> {
        self.run_with(constants, None, |_| {})
    }

    /// Run every step, reporting each completed point to `observer`.
    ///
    /// `observer` is called from worker threads in completion order, which
    /// is not sweep order.
    pub fn run_with<F>(
        &self,
        constants: &OpticalConstants,
        cancel: Option<&CancelToken>,
        observer: F,
    ) -> Result<SweepResult, TmmError>
    where
        F: Fn(&SweepPoint) + Sync,
    {
        let simulation = DeviceSimulation::new(constants, self.active_layer, self.x_step)?;
        let values = self.range.values();
        let cancelled = || cancel.is_some_and(CancelToken::is_cancelled);

        info!(
            "Sweeping layer {} ({}) over {} thicknesses, {} wavelengths",
            self.varied_layer,
            self.stack.layers()[self.varied_layer].name,
            values.len(),
            constants.grid().len()
        );

        let points = values
            .par_iter()
            .map(|&thickness_nm| {
                if cancelled() {
                    return Err(TmmError::Cancelled);
                }
                let stack = self.stack_at(thickness_nm)?;
                let solution = simulation.run(&stack)?;
                let point = SweepPoint {
                    thickness_nm,
                    jsc: solution.jsc,
                    singularities: solution.singularities,
                };
                debug!(
                    "{:.2} nm: Jsc {:.4} mA/cm² ({} singularities)",
                    thickness_nm,
                    point.jsc,
                    point.singularities.len()
                );
                observer(&point);
                Ok(point)
            })
            .collect::<Result<Vec<_>, TmmError>>()?;

        let result = SweepResult { points };
        if let Some(best) = result.best() {
            info!(
                "Sweep finished: max Jsc {:.4} mA/cm² at {:.2} nm, {} singularities",
                best.jsc,
                best.thickness_nm,
                result.singularity_count()
            );
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::WavelengthGrid;
    use ndarray::Array2;
    use num_complex::Complex64;
    use std::sync::atomic::AtomicUsize;

    fn absorber_constants() -> OpticalConstants {
        let grid = WavelengthGrid::from_range(450.0, 550.0, 25.0).unwrap();
        let indices = Array2::from_shape_fn((2, grid.len()), |(layer, _)| {
            if layer == 0 {
                Complex64::new(1.5, 0.0)
            } else {
                Complex64::new(2.0, 0.1)
            }
        });
        let spectrum = vec![0.1; grid.len()];
        OpticalConstants::new(grid, vec!["glass".into(), "absorber".into()], indices, spectrum)
            .unwrap()
    }

    fn absorber_sweep() -> ThicknessSweep {
        let stack = Stack::from_parts(&["glass", "absorber"], &[0.0, 100.0]).unwrap();
        let range = SweepRange::new(0.0, 300.0, 5.0).unwrap();
        ThicknessSweep::new(stack, 1, 1, range, 5.0).unwrap()
    }

    #[test]
    fn test_layer_roles_validated() {
        let stack = Stack::from_parts(&["glass", "a", "b"], &[0.0, 10.0, 10.0]).unwrap();
        let range = SweepRange::single(10.0).unwrap();
        assert!(matches!(
            ThicknessSweep::new(stack.clone(), 3, 1, range, 5.0),
            Err(ConfigError::LayerIndexOutOfRange { role: "active", .. })
        ));
        assert!(matches!(
            ThicknessSweep::new(stack.clone(), 1, 0, range, 5.0),
            Err(ConfigError::IncidenceLayerSelected { role: "varied" })
        ));
        assert!(matches!(
            ThicknessSweep::new(stack, 1, 2, range, f64::NAN),
            Err(ConfigError::NonPositiveStep { .. })
        ));
    }

    #[test]
    fn test_sweep_is_ordered_and_deterministic() {
        let constants = absorber_constants();
        let sweep = absorber_sweep();

        let first = sweep.run(&constants).unwrap();
        let second = sweep.run(&constants).unwrap();
        assert_eq!(first.len(), 61);
        assert_eq!(first, second);

        let thicknesses = first.thicknesses();
        assert_eq!(thicknesses[0], 0.0);
        assert_eq!(thicknesses[60], 300.0);
        assert!(thicknesses.windows(2).all(|w| w[1] > w[0]));

        // No absorber, no current
        assert_eq!(first.points()[0].jsc, 0.0);
        assert!(first.points().iter().all(SweepPoint::is_regular));
    }

    #[test]
    fn test_observer_sees_every_step() {
        let constants = absorber_constants();
        let sweep = absorber_sweep();
        let seen = AtomicUsize::new(0);
        sweep
            .run_with(&constants, None, |_| {
                seen.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        assert_eq!(seen.load(Ordering::Relaxed), 61);
    }

    #[test]
    fn test_cancelled_sweep() {
        let constants = absorber_constants();
        let sweep = absorber_sweep();

        let token = CancelToken::new();
        token.cancel();
        assert!(matches!(
            sweep.run_with(&constants, Some(&token), |_| {}),
            Err(TmmError::Cancelled)
        ));

        // One worker runs the steps in order, so the flag set by the first
        // completed step is seen by the second
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let token = CancelToken::new();
        let result = pool.install(|| sweep.run_with(&constants, Some(&token), |_| token.cancel()));
        assert!(matches!(result, Err(TmmError::Cancelled)));
    }

    #[test]
    fn test_cancel_after_last_step_keeps_result() {
        let constants = absorber_constants();
        let sweep = absorber_sweep();
        let token = CancelToken::new();
        let done = AtomicUsize::new(0);

        let result = sweep.run_with(&constants, Some(&token), |_| {
            if done.fetch_add(1, Ordering::SeqCst) + 1 == 61 {
                token.cancel();
            }
        });
        assert!(token.is_cancelled());
        assert_eq!(result.unwrap().len(), 61);
    }

    #[test]
    fn test_singular_steps_are_recorded_not_fatal() {
        let grid = WavelengthGrid::single(500.0).unwrap();
        let indices = Array2::from_shape_fn((2, 1), |(layer, _)| {
            if layer == 0 {
                Complex64::new(1.5, 0.0)
            } else {
                Complex64::new(2.0, -50.0)
            }
        });
        let constants =
            OpticalConstants::new(grid, vec!["glass".into(), "gain".into()], indices, vec![0.1])
                .unwrap();
        let stack = Stack::from_parts(&["glass", "gain"], &[0.0, 0.0]).unwrap();
        let range = SweepRange::new(0.0, 100.0, 100.0).unwrap();
        let sweep = ThicknessSweep::new(stack, 1, 1, range, 5.0).unwrap();

        let result = sweep.run(&constants).unwrap();
        assert_eq!(result.thicknesses(), vec![0.0, 100.0]);
        // The empty layer has no samples to reconstruct
        assert!(result.points()[0].is_regular());
        assert_eq!(result.singularity_count(), 1);

        let point = &result.points()[1];
        assert!(!point.is_regular());
        assert_eq!(point.jsc, 0.0);
        assert_eq!(point.singularities[0].samples, 20);
        assert!(matches!(
            point.require_regular(),
            Err(TmmError::NumericalSingularity { layer: 1, thickness_nm, .. }) if thickness_nm == 100.0
        ));
    }

    #[test]
    fn test_require_regular() {
        let regular = SweepPoint {
            thickness_nm: 50.0,
            jsc: 1.5,
            singularities: vec![],
        };
        assert_eq!(regular.require_regular().unwrap(), 1.5);

        let singular = SweepPoint {
            thickness_nm: 50.0,
            jsc: 1.5,
            singularities: vec![Singularity {
                wavelength_nm: 600.0,
                layer: 2,
                layer_thickness_nm: 7.0,
                samples: 1,
            }],
        };
        assert!(matches!(
            singular.require_regular(),
            Err(TmmError::NumericalSingularity { layer: 2, thickness_nm, .. }) if thickness_nm == 7.0
        ));
    }

    #[test]
    fn test_best_point() {
        let point = |t: f64, jsc: f64| SweepPoint {
            thickness_nm: t,
            jsc,
            singularities: vec![],
        };
        let result = SweepResult {
            points: vec![point(0.0, 0.0), point(5.0, 2.0), point(10.0, 2.0), point(15.0, 1.0)],
        };
        assert_eq!(result.best().unwrap().thickness_nm, 5.0);
        assert_eq!(result.currents(), vec![0.0, 2.0, 2.0, 1.0]);
    }
}
