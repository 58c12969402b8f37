//! 2×2 complex transfer matrices for interfaces and homogeneous slabs.
//!
//! A transfer matrix relates the forward/backward field amplitudes on one
//! side of an element to those on the other side. Chaining elements is a
//! matrix product taken in propagation order, so the type only exposes the
//! true matrix product through [`Mul`]; there is no element-wise multiply.

use std::f64::consts::PI;
use std::ops::{Index, Mul};

use num_complex::Complex64;

use super::OpticsError;

/// A 2×2 complex matrix stored row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferMatrix {
    m: [[Complex64; 2]; 2],
}

impl TransferMatrix {
    pub fn new(m00: Complex64, m01: Complex64, m10: Complex64, m11: Complex64) -> Self {
        Self {
            m: [[m00, m01], [m10, m11]],
        }
    }

    pub fn identity() -> Self {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        Self::new(one, zero, zero, one)
    }

    pub fn diagonal(d0: Complex64, d1: Complex64) -> Self {
        let zero = Complex64::new(0.0, 0.0);
        Self::new(d0, zero, zero, d1)
    }

    /// Multiply every element by a scalar.
    pub fn scale(&self, factor: Complex64) -> Self {
        Self::new(
            self.m[0][0] * factor,
            self.m[0][1] * factor,
            self.m[1][0] * factor,
            self.m[1][1] * factor,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.m.iter().flatten().all(|c| c.is_finite())
    }

    /// Interface matrix for light travelling from medium `n1` into `n2`.
    ///
    /// Uses the Fresnel amplitude coefficients at normal incidence,
    /// `r = (n1 - n2)/(n1 + n2)` and `t = 2 n1/(n1 + n2)`, and returns
    /// `(1/t) [[1, r], [r, 1]]`. Identical media give the identity exactly.
    ///
    /// # Errors
    ///
    /// `OpticsError::DegenerateInterface` when `n1 + n2` vanishes or the
    /// result is not finite, which only happens for unphysical index pairs.
    pub fn interface(n1: Complex64, n2: Complex64) -> Result<Self, OpticsError> {
        if n1 == n2 {
            return Ok(Self::identity());
        }

        let sum = n1 + n2;
        if sum.norm() == 0.0 || n1.norm() == 0.0 {
            return Err(OpticsError::DegenerateInterface { n1, n2 });
        }

        let r = (n1 - n2) / sum;
        let t = (n1 * 2.0) / sum;
        let one = Complex64::new(1.0, 0.0);
        let matrix = Self::new(one, r, r, one).scale(t.inv());

        if !matrix.is_finite() {
            return Err(OpticsError::DegenerateInterface { n1, n2 });
        }
        Ok(matrix)
    }

    /// Propagation matrix through a slab of index `n` and thickness `d`.
    ///
    /// With the phase `ξ = 2π d n / λ` this is `diag(exp(-iξ), exp(+iξ))`.
    /// `d` and `wavelength` share a length unit (nm throughout this crate).
    /// A zero thickness yields the identity exactly.
    pub fn propagation(n: Complex64, thickness: f64, wavelength: f64) -> Self {
        if thickness == 0.0 {
            return Self::identity();
        }

        let xi = n * (2.0 * PI * thickness / wavelength);
        let i = Complex64::i();
        Self::diagonal((-i * xi).exp(), (i * xi).exp())
    }
}

impl Index<(usize, usize)> for TransferMatrix {
    type Output = Complex64;

    fn index(&self, (row, col): (usize, usize)) -> &Complex64 {
        &self.m[row][col]
    }
}

impl Mul for TransferMatrix {
    type Output = TransferMatrix;

    fn mul(self, rhs: TransferMatrix) -> TransferMatrix {
        let a = &self.m;
        let b = &rhs.m;
        TransferMatrix::new(
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        )
    }
}
