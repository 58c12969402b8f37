//! Coherent solution of the whole stack at one wavelength

use ndarray::ArrayView1;
use num_complex::Complex64;

use super::{OpticsError, TransferMatrix, REFLECTANCE_TOLERANCE};

/// Total system matrix of a stack and the power coefficients derived from it.
#[derive(Debug, Clone, Copy)]
pub struct StackSolution {
    /// Total transfer matrix S from the incidence medium to the exit medium
    pub matrix: TransferMatrix,

    /// Power reflectance |S₁₀/S₀₀|², clamped into [0, 1]
    pub reflectance: f64,

    /// Power transmittance into the exit medium, Re(n_last)/Re(n₀)·|1/S₀₀|²
    ///
    /// Only meaningful when the incidence medium is transparent.
    pub transmittance: f64,
}

impl StackSolution {
    /// Fraction of the incident power neither reflected nor transmitted.
    pub fn absorptance(&self) -> f64 {
        1.0 - self.reflectance - self.transmittance
    }
}

/// Chain interface and propagation matrices across the whole stack.
///
/// Builds `S = I₀₁ · Π (L_j · I_{j,j+1})` for every layer strictly between
/// the first and last. The first and last layers are semi-infinite here, so
/// their thicknesses are ignored.
///
/// # Arguments
///
/// * `indices` - Complex refractive index of each layer at this wavelength
/// * `thicknesses` - Layer thicknesses in nm, same length as `indices`
/// * `wavelength_nm` - Vacuum wavelength in nm
///
/// # Errors
///
/// * `OpticsError::TooFewLayers` - fewer than two layers
/// * `OpticsError::DegenerateInterface` - an interface cannot be built
/// * `OpticsError::UnphysicalReflectance` - R is non-finite or leaves
///   [0, 1] by more than [`REFLECTANCE_TOLERANCE`]
pub fn solve_coherent(
    indices: ArrayView1<'_, Complex64>,
    thicknesses: &[f64],
    wavelength_nm: f64,
) -> Result<StackSolution, OpticsError> {
    let count = indices.len();
    if count < 2 {
        return Err(OpticsError::TooFewLayers(count));
    }
    let last = count - 1;

    let mut matrix = TransferMatrix::interface(indices[0], indices[1])?;
    for j in 1..last {
        let propagation = TransferMatrix::propagation(indices[j], thicknesses[j], wavelength_nm);
        let interface = TransferMatrix::interface(indices[j], indices[j + 1])?;
        matrix = matrix * propagation * interface;
    }

    let s00 = matrix[(0, 0)];
    let raw_reflectance = (matrix[(1, 0)] / s00).norm_sqr();
    if !raw_reflectance.is_finite() || raw_reflectance > 1.0 + REFLECTANCE_TOLERANCE {
        return Err(OpticsError::UnphysicalReflectance {
            wavelength_nm,
            reflectance: raw_reflectance,
        });
    }

    let transmittance = indices[last].re / indices[0].re * s00.inv().norm_sqr();

    Ok(StackSolution {
        matrix,
        reflectance: raw_reflectance.clamp(0.0, 1.0),
        transmittance,
    })
}
