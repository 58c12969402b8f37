//! Piecewise-linear interpolation of tabulated data.
//!
//! Material tables and the illumination spectrum are sampled on their own
//! wavelength points; everything downstream works on the uniform
//! [`WavelengthGrid`](crate::grid::WavelengthGrid). [`LinearTable`] bridges
//! the two.

use thiserror::Error;

/// Errors that can occur during interpolation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpError {
    #[error("Value {0} is out of bounds for interpolation range [{1}, {2}]")]
    OutOfBounds(f64, f64, f64),
    #[error("Input vectors must have at least 2 points")]
    InsufficientData,
    #[error("Input vectors must have the same length")]
    MismatchedLengths,
    #[error("X values must be strictly ascending")]
    UnsortedData,
}

/// Samples `ys(xs)` checked once on construction, then looked up in O(log n).
#[derive(Debug, Clone, PartialEq)]
pub struct LinearTable {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl LinearTable {
    /// # Errors
    ///
    /// * `InterpError::InsufficientData` - fewer than 2 points
    /// * `InterpError::MismatchedLengths` - `xs` and `ys` differ in length
    /// * `InterpError::UnsortedData` - `xs` is not strictly ascending
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, InterpError> {
        if xs.len() != ys.len() {
            return Err(InterpError::MismatchedLengths);
        }
        if xs.len() < 2 {
            return Err(InterpError::InsufficientData);
        }
        if xs.windows(2).any(|w| w[1] <= w[0]) {
            return Err(InterpError::UnsortedData);
        }
        Ok(Self { xs, ys })
    }

    /// Covered abscissa range `(first, last)`
    pub fn range(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Linearly interpolated value at `x`.
    ///
    /// # Errors
    ///
    /// `InterpError::OutOfBounds` when `x` is outside the table; no
    /// extrapolation is done.
    pub fn at(&self, x: f64) -> Result<f64, InterpError> {
        let (lo, hi) = self.range();
        if !(lo..=hi).contains(&x) {
            return Err(InterpError::OutOfBounds(x, lo, hi));
        }

        // First index whose abscissa is >= x
        let upper = self.xs.partition_point(|&xi| xi < x);
        if self.xs[upper] == x {
            return Ok(self.ys[upper]);
        }

        let (x1, x2) = (self.xs[upper - 1], self.xs[upper]);
        let (y1, y2) = (self.ys[upper - 1], self.ys[upper]);
        let t = (x - x1) / (x2 - x1);
        Ok(y1 + t * (y2 - y1))
    }

    /// Values at every point of `targets`.
    pub fn onto(&self, targets: &[f64]) -> Result<Vec<f64>, InterpError> {
        targets.iter().map(|&x| self.at(x)).collect()
    }
}
