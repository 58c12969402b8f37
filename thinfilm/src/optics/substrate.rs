//! Incoherent treatment of the optically thick substrate.
//!
//! Light enters from air through a substrate much thicker than the
//! coherence length, so interference inside it averages out and only power
//! coefficients of the air/substrate boundary matter. These depend on the
//! substrate index alone and are computed once per wavelength.

use num_complex::Complex64;

use super::OpticsError;

/// Power coefficients of the air/substrate boundary at one wavelength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubstrateTerms {
    /// Incoherent power transmittance |4 n₀ / (1 + n₀)²|
    pub transmittance: f64,

    /// Incoherent power reflectance |(1 − n₀)/(1 + n₀)|²
    pub reflectance: f64,

    /// Air-side amplitude factor |2 / (1 + n₀)|
    pub amplitude: f64,
}

impl SubstrateTerms {
    /// Coefficients for a substrate of index `n0` illuminated from air.
    pub fn from_index(n0: Complex64) -> Result<Self, OpticsError> {
        let air = Complex64::new(1.0, 0.0);
        let sum = air + n0;
        if sum.norm() == 0.0 {
            return Err(OpticsError::DegenerateInterface { n1: air, n2: n0 });
        }

        Ok(Self {
            transmittance: (n0 * 4.0 / (sum * sum)).norm(),
            reflectance: ((air - n0) / sum).norm_sqr(),
            amplitude: (2.0 / sum).norm(),
        })
    }

    /// Field transmission factor T into the coherent part of the stack.
    ///
    /// Multiple incoherent bounces between the air/substrate boundary and
    /// the stack (reflectance `stack_reflectance`) enhance the field by
    /// `1 / sqrt(1 − R_glass · R)`.
    pub fn field_transmission(
        &self,
        stack_reflectance: f64,
        wavelength_nm: f64,
    ) -> Result<f64, OpticsError> {
        let remaining = 1.0 - self.reflectance * stack_reflectance;
        if remaining.is_nan() || remaining <= 0.0 {
            return Err(OpticsError::UnphysicalReflectance {
                wavelength_nm,
                reflectance: stack_reflectance,
            });
        }
        Ok(self.amplitude / remaining.sqrt())
    }
}
