//! Uniform sampling grids: the working wavelength grid and the thickness sweep.

use crate::config::ConfigError;

/// Relative tolerance used when checking that explicit grid values are uniform
const UNIFORM_TOLERANCE: f64 = 1e-9;

/// Number of lattice points `start + i*step` that do not exceed `stop`.
///
/// The small slack absorbs representation error when `stop` lies exactly on
/// the lattice (e.g. 0.1-nm steps).
fn lattice_count(start: f64, stop: f64, step: f64) -> usize {
    ((stop - start) / step + 1e-9).floor() as usize + 1
}

fn check_step(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::NonPositiveStep { name, value });
    }
    Ok(())
}

/// Strictly increasing, uniformly spaced wavelengths in nanometers.
///
/// Every per-wavelength quantity in the pipeline (refractive indices,
/// spectrum, field columns) is aligned with one of these grids.
#[derive(Debug, Clone, PartialEq)]
pub struct WavelengthGrid {
    wavelengths: Vec<f64>,
    step: f64,
}

impl WavelengthGrid {
    /// Build the grid `start, start+step, ...` up to and including `stop`
    /// when it falls on the lattice.
    ///
    /// # Errors
    ///
    /// `ConfigError` if any bound is non-positive or non-finite, the step is
    /// not positive, or `stop < start`.
    pub fn from_range(start: f64, stop: f64, step: f64) -> Result<Self, ConfigError> {
        check_step("wavelength step", step)?;
        if !start.is_finite() || !stop.is_finite() || start <= 0.0 || stop < start {
            return Err(ConfigError::MalformedRange {
                name: "wavelength",
                start,
                end: stop,
            });
        }

        let count = lattice_count(start, stop, step);
        let wavelengths = (0..count).map(|i| start + i as f64 * step).collect();
        Ok(Self { wavelengths, step })
    }

    /// Build a grid from explicit values, checking that they are positive,
    /// strictly increasing and uniformly spaced.
    pub fn from_values(wavelengths: Vec<f64>) -> Result<Self, ConfigError> {
        if wavelengths.is_empty() {
            return Err(ConfigError::EmptyGrid);
        }
        if let Some(&bad) = wavelengths.iter().find(|w| !w.is_finite() || **w <= 0.0) {
            return Err(ConfigError::MalformedRange {
                name: "wavelength",
                start: bad,
                end: bad,
            });
        }
        if let Some(i) = wavelengths.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ConfigError::NotIncreasing(i + 1));
        }

        if wavelengths.len() == 1 {
            return Ok(Self {
                wavelengths,
                step: 1.0,
            });
        }

        let n = wavelengths.len();
        let step = (wavelengths[n - 1] - wavelengths[0]) / (n - 1) as f64;
        for (i, w) in wavelengths.windows(2).enumerate() {
            let found = w[1] - w[0];
            if (found - step).abs() > UNIFORM_TOLERANCE * step {
                return Err(ConfigError::NonUniform {
                    index: i + 1,
                    found,
                    expected: step,
                });
            }
        }

        Ok(Self { wavelengths, step })
    }

    /// A grid holding a single wavelength.
    pub fn single(wavelength_nm: f64) -> Result<Self, ConfigError> {
        Self::from_values(vec![wavelength_nm])
    }

    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    /// Integration weight per wavelength sample in nm.
    ///
    /// A single-point grid integrates with a nominal 1 nm width.
    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn first(&self) -> f64 {
        self.wavelengths[0]
    }

    pub fn last(&self) -> f64 {
        self.wavelengths[self.wavelengths.len() - 1]
    }
}

/// Thickness values (nm) visited by a sweep, inclusive of both end points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepRange {
    start: f64,
    finish: f64,
    step: f64,
}

impl SweepRange {
    pub fn new(start: f64, finish: f64, step: f64) -> Result<Self, ConfigError> {
        check_step("sweep step", step)?;
        if !start.is_finite() || !finish.is_finite() || start < 0.0 || finish < start {
            return Err(ConfigError::MalformedRange {
                name: "sweep",
                start,
                end: finish,
            });
        }
        Ok(Self {
            start,
            finish,
            step,
        })
    }

    /// A sweep that visits a single thickness.
    pub fn single(thickness_nm: f64) -> Result<Self, ConfigError> {
        Self::new(thickness_nm, thickness_nm, 1.0)
    }

    /// Number of sweep points: `floor((finish - start) / step) + 1`
    pub fn len(&self) -> usize {
        lattice_count(self.start, self.finish, self.step)
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn values(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| self.start + i as f64 * self.step)
            .collect()
    }
}
