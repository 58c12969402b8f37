//! Electric field reconstruction inside a layer.
//!
//! For layer m the stack is split into a front part S′ (incidence medium up
//! to and including the interface into m) and a back part S″ (from m to the
//! exit medium). The field at distance `x` from the front of m is
//!
//! ```text
//! E(x) = T [S″₀₀ e^{−iξ(d−x)} + S″₁₀ e^{+iξ(d−x)}]
//!        / [S′₀₀ S″₀₀ e^{−iξd} + S′₀₁ S″₁₀ e^{+iξd}]
//! ```
//!
//! with `ξ = 2π n_m / λ` and `d` the thickness of m. The field is
//! normalised to the incident field in air.

use std::f64::consts::PI;

use ndarray::ArrayView1;
use num_complex::Complex64;

use super::{OpticsError, TransferMatrix, SINGULARITY_THRESHOLD};

/// The two partial system matrices around one layer.
#[derive(Debug, Clone, Copy)]
pub struct PartialProducts {
    /// S′ = I₀₁ · Π_{j=1}^{m−1} (L_j · I_{j,j+1})
    pub s_prime: TransferMatrix,

    /// S″ = Π_{j=m}^{last−1} (I_{j,j+1} · L_{j+1})
    pub s_double_prime: TransferMatrix,
}

impl PartialProducts {
    /// Build S′ and S″ for `layer` (1 ≤ layer ≤ last).
    ///
    /// For the last layer S″ is the identity.
    pub fn around_layer(
        indices: ArrayView1<'_, Complex64>,
        thicknesses: &[f64],
        wavelength_nm: f64,
        layer: usize,
    ) -> Result<Self, OpticsError> {
        let count = indices.len();
        if count < 2 {
            return Err(OpticsError::TooFewLayers(count));
        }
        debug_assert!(layer >= 1 && layer < count, "layer {layer} outside 1..{count}");
        let last = count - 1;

        let mut s_prime = TransferMatrix::interface(indices[0], indices[1])?;
        for j in 1..layer {
            s_prime = s_prime
                * TransferMatrix::propagation(indices[j], thicknesses[j], wavelength_nm)
                * TransferMatrix::interface(indices[j], indices[j + 1])?;
        }

        let mut s_double_prime = TransferMatrix::identity();
        for j in layer..last {
            s_double_prime = s_double_prime
                * TransferMatrix::interface(indices[j], indices[j + 1])?
                * TransferMatrix::propagation(indices[j + 1], thicknesses[j + 1], wavelength_nm);
        }

        Ok(Self {
            s_prime,
            s_double_prime,
        })
    }
}

/// Evaluates the field at any depth of one layer for one wavelength.
///
/// The denominator only depends on the layer, so it is computed (and checked
/// for singularity) once; [`amplitude`](Self::amplitude) is then cheap per
/// sample point.
#[derive(Debug, Clone, Copy)]
pub struct LayerFieldSolver {
    xi: Complex64,
    thickness: f64,
    forward: Complex64,
    backward: Complex64,
}

impl LayerFieldSolver {
    /// # Arguments
    ///
    /// * `indices` - Complex index of every layer at this wavelength
    /// * `thicknesses` - Layer thicknesses in nm
    /// * `wavelength_nm` - Vacuum wavelength in nm
    /// * `layer` - Layer to evaluate (1 ≤ layer ≤ last)
    /// * `field_transmission` - Incoherent substrate factor T at this wavelength
    ///
    /// # Errors
    ///
    /// `OpticsError::Singularity` when the denominator modulus falls below
    /// [`SINGULARITY_THRESHOLD`] or is not finite, plus any error from
    /// building the partial products.
    pub fn new(
        indices: ArrayView1<'_, Complex64>,
        thicknesses: &[f64],
        wavelength_nm: f64,
        layer: usize,
        field_transmission: f64,
    ) -> Result<Self, OpticsError> {
        let products =
            PartialProducts::around_layer(indices, thicknesses, wavelength_nm, layer)?;
        let sp = products.s_prime;
        let sdp = products.s_double_prime;

        let xi = indices[layer] * (2.0 * PI / wavelength_nm);
        let thickness = thicknesses[layer];
        let i = Complex64::i();

        let denominator = sp[(0, 0)] * sdp[(0, 0)] * (-i * xi * thickness).exp()
            + sp[(0, 1)] * sdp[(1, 0)] * (i * xi * thickness).exp();
        let modulus = denominator.norm();
        if !modulus.is_finite() || modulus < SINGULARITY_THRESHOLD {
            return Err(OpticsError::Singularity {
                wavelength_nm,
                layer,
                layer_thickness_nm: thickness,
                denominator: modulus,
            });
        }

        let scale = field_transmission / denominator;
        Ok(Self {
            xi,
            thickness,
            forward: sdp[(0, 0)] * scale,
            backward: sdp[(1, 0)] * scale,
        })
    }

    /// Complex field amplitude at `x` nm from the front of the layer.
    pub fn amplitude(&self, x: f64) -> Complex64 {
        let phase = Complex64::i() * self.xi * (self.thickness - x);
        self.forward * (-phase).exp() + self.backward * phase.exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optics::{solve_coherent, SubstrateTerms};
    use approx::assert_relative_eq;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn field_amplitude(
        indices: ArrayView1<'_, Complex64>,
        thicknesses: &[f64],
        wavelength_nm: f64,
        layer: usize,
        field_transmission: f64,
        x: f64,
    ) -> Result<Complex64, OpticsError> {
        LayerFieldSolver::new(indices, thicknesses, wavelength_nm, layer, field_transmission)
            .map(|solver| solver.amplitude(x))
    }

    #[test]
    fn test_partial_products_recompose_total_matrix() {
        // S′ · L_m · S″ (without the exit slab propagation) equals S
        let n = array![c(1.5, 0.0), c(1.9, 0.01), c(2.1, 0.3), c(1.2, 6.0)];
        let d = [0.0, 110.0, 80.0, 100.0];
        let wl = 520.0;

        let total = solve_coherent(n.view(), &d, wl).unwrap().matrix;
        let parts = PartialProducts::around_layer(n.view(), &d, wl, 2).unwrap();
        let exit_inverse = TransferMatrix::propagation(n[3], -d[3], wl);
        let recomposed = parts.s_prime
            * TransferMatrix::propagation(n[2], d[2], wl)
            * parts.s_double_prime
            * exit_inverse;

        for r in 0..2 {
            for col in 0..2 {
                assert_relative_eq!(
                    recomposed[(r, col)].re,
                    total[(r, col)].re,
                    epsilon = 1e-9,
                    max_relative = 1e-9
                );
                assert_relative_eq!(
                    recomposed[(r, col)].im,
                    total[(r, col)].im,
                    epsilon = 1e-9,
                    max_relative = 1e-9
                );
            }
        }
    }

    #[test]
    fn test_last_layer_has_identity_back_part() {
        let n = array![c(1.5, 0.0), c(2.0, 0.1)];
        let parts = PartialProducts::around_layer(n.view(), &[0.0, 100.0], 500.0, 1).unwrap();
        assert_eq!(parts.s_double_prime, TransferMatrix::identity());
        assert_eq!(
            parts.s_prime,
            TransferMatrix::interface(n[0], n[1]).unwrap()
        );
    }

    #[test]
    fn test_semi_infinite_absorber_field_decays() {
        let n = array![c(1.5, 0.0), c(2.0, 0.1)];
        let d = [0.0, 100.0];
        let wl = 500.0;
        let terms = SubstrateTerms::from_index(n[0]).unwrap();
        let r = solve_coherent(n.view(), &d, wl).unwrap().reflectance;
        let t = terms.field_transmission(r, wl).unwrap();
        let solver = LayerFieldSolver::new(n.view(), &d, wl, 1, t).unwrap();

        // Only a forward wave: E(x) = T t₀₁ exp(iξx)
        let t01 = (n[0] * 2.0 / (n[0] + n[1])).norm();
        let alpha = 4.0 * PI * 0.1 / wl;
        for x in [0.0, 2.5, 50.0, 97.5] {
            let intensity = solver.amplitude(x).norm_sqr();
            assert_relative_eq!(
                intensity,
                (t * t01).powi(2) * (-alpha * x).exp(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_field_is_continuous_across_interface() {
        let n = array![c(1.5, 0.0), c(1.9, 0.02), c(2.0, 0.3), c(1.3, 7.0)];
        let d = [0.0, 110.0, 90.0, 150.0];
        let wl = 600.0;
        let terms = SubstrateTerms::from_index(n[0]).unwrap();
        let r = solve_coherent(n.view(), &d, wl).unwrap().reflectance;
        let t = terms.field_transmission(r, wl).unwrap();

        let end_of_first = field_amplitude(n.view(), &d, wl, 1, t, d[1]).unwrap();
        let start_of_second = field_amplitude(n.view(), &d, wl, 2, t, 0.0).unwrap();
        assert_relative_eq!(end_of_first.re, start_of_second.re, epsilon = 1e-9);
        assert_relative_eq!(end_of_first.im, start_of_second.im, epsilon = 1e-9);
    }

    #[test]
    fn test_gain_medium_denominator_is_singular() {
        // Im(n) < 0 makes e^{-iξd} vanish, taking the denominator with it
        let n = array![c(1.5, 0.0), c(2.0, -50.0)];
        let result = LayerFieldSolver::new(n.view(), &[0.0, 100.0], 500.0, 1, 0.8);
        assert!(matches!(
            result,
            Err(OpticsError::Singularity { layer: 1, layer_thickness_nm, denominator, .. })
                if layer_thickness_nm == 100.0 && denominator < SINGULARITY_THRESHOLD
        ));
    }

    #[test]
    fn test_zero_transmission_is_not_singular() {
        let n = array![c(1.5, 0.0), c(2.0, 0.1)];
        let e = field_amplitude(n.view(), &[0.0, 50.0], 500.0, 1, 0.0, 10.0).unwrap();
        assert_eq!(e.norm(), 0.0);
    }
}
