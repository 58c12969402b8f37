//! Absorption, exciton generation and short-circuit current density.
//!
//! With the field `E(x, λ)` normalised to the incident field, the power
//! dissipated per unit volume and wavelength in a layer is
//! `Q = α Re(n) S(λ) |E|²`, `α = 4π Im(n)/λ`. Dividing by the photon energy
//! gives the exciton generation rate; integrating it over wavelength and
//! depth and multiplying by `q` gives Jsc at unit internal quantum
//! efficiency.
//!
//! Unit chain: `S` in mW cm⁻² nm⁻¹, `α` in cm⁻¹, `Gxl` in
//! cm⁻³ s⁻¹ nm⁻¹, `Gx` in cm⁻³ s⁻¹, Jsc in mA cm⁻².

use std::f64::consts::PI;

use ndarray::{Array2, ArrayView2, Axis};
use num_complex::Complex64;

use crate::materials::OpticalConstants;
use crate::units::{
    photon_energy_joules, AMP_TO_MILLIAMP, MILLIWATT_TO_WATT, NM_TO_CM, SI,
};

/// Absorption coefficient `4π Im(n)/λ` in cm⁻¹ for `λ` in nm.
pub fn absorption_coefficient(n: Complex64, wavelength_nm: f64) -> f64 {
    4.0 * PI * n.im / (wavelength_nm * NM_TO_CM)
}

/// Exciton generation rate `Gxl(x, λ)` for the samples of one layer.
///
/// # Arguments
///
/// * `field` - Field amplitudes, one row per sample in `layer`, one column per grid wavelength
/// * `constants` - Optical inputs on the same grid
/// * `layer` - Layer the samples belong to
///
/// # Returns
///
/// Generation rate in cm⁻³ s⁻¹ nm⁻¹ with the same shape as `field`
pub fn exciton_generation(
    field: ArrayView2<'_, Complex64>,
    constants: &OpticalConstants,
    layer: usize,
) -> Array2<f64> {
    let wavelengths = constants.grid().wavelengths();
    let spectrum = constants.spectrum();

    // Per-wavelength factor a·Re(n)·S / (photon energy), W → photons
    let weight: Vec<f64> = wavelengths
        .iter()
        .enumerate()
        .map(|(j, &wl)| {
            let dissipation =
                constants.absorption(layer, j) * constants.index(layer, j).re * spectrum[j];
            dissipation * MILLIWATT_TO_WATT / photon_energy_joules(wl)
        })
        .collect();

    Array2::from_shape_fn(field.dim(), |(k, j)| weight[j] * field[[k, j]].norm_sqr())
}

/// Integrate `Gxl` over the uniform wavelength grid, giving `Gx(x)`.
///
/// A plain sum times the grid step, which is exact for the rectangle rule
/// on a uniform grid.
pub fn integrate_wavelength(generation: ArrayView2<'_, f64>, wavelength_step: f64) -> Vec<f64> {
    generation
        .sum_axis(Axis(1))
        .iter()
        .map(|g| g * wavelength_step)
        .collect()
}

/// Short-circuit current density in mA cm⁻² from a generation profile.
///
/// # Arguments
///
/// * `generation_profile` - `Gx` at each sample in cm⁻³ s⁻¹
/// * `x_step` - Sample spacing in nm
pub fn short_circuit_current(generation_profile: &[f64], x_step: f64) -> f64 {
    let excitons_per_area: f64 = generation_profile.iter().sum::<f64>() * x_step * NM_TO_CM;
    excitons_per_area * SI::ELEMENTARY_CHARGE * AMP_TO_MILLIAMP
}

/// Current density if every incident photon on the grid produced one carrier.
///
/// Upper bound for any Jsc computed with the same spectrum and grid.
pub fn ideal_current(constants: &OpticalConstants) -> f64 {
    let step = constants.grid().step();
    let photon_flux: f64 = constants
        .grid()
        .wavelengths()
        .iter()
        .zip(constants.spectrum())
        .map(|(&wl, &irradiance)| irradiance * MILLIWATT_TO_WATT / photon_energy_joules(wl))
        .sum::<f64>()
        * step;
    photon_flux * SI::ELEMENTARY_CHARGE * AMP_TO_MILLIAMP
}

/// Fraction of the incident power absorbed in one layer at each wavelength.
///
/// `A(λ) = Σₓ α Re(n) |E|² Δx`, using the samples falling inside `layer`.
pub fn layer_absorptance(
    field: ArrayView2<'_, Complex64>,
    constants: &OpticalConstants,
    layer: usize,
    x_step: f64,
) -> Vec<f64> {
    let intensity = field.mapv(|e| e.norm_sqr()).sum_axis(Axis(0));
    intensity
        .iter()
        .enumerate()
        .map(|(j, &sum)| {
            constants.absorption(layer, j) * constants.index(layer, j).re * sum * x_step * NM_TO_CM
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::WavelengthGrid;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn single_wavelength_constants(spectrum: f64) -> OpticalConstants {
        OpticalConstants::new(
            WavelengthGrid::single(500.0).unwrap(),
            vec!["glass".into(), "absorber".into()],
            array![[Complex64::new(1.5, 0.0)], [Complex64::new(2.0, 0.1)]],
            vec![spectrum],
        )
        .unwrap()
    }

    #[test]
    fn test_absorption_coefficient_units() {
        // k = 1 at 1 µm → 4π / 1e-4 cm
        let a = absorption_coefficient(Complex64::new(1.0, 1.0), 1000.0);
        assert_relative_eq!(a, 4.0 * PI * 1e4, epsilon = 1e-6);
        assert_eq!(absorption_coefficient(Complex64::new(1.5, 0.0), 500.0), 0.0);
    }

    #[test]
    fn test_full_absorption_reaches_ideal_current() {
        // A slab whose absorptance sums to one must give the ideal current
        let constants = single_wavelength_constants(0.1);
        let a = constants.absorption(1, 0) * constants.index(1, 0).re;
        let x_step = 5.0;
        let samples = 10;
        // Choose |E|² so that Σ a·Re(n)·|E|²·Δx = 1
        let intensity = 1.0 / (a * x_step * NM_TO_CM * samples as f64);
        let field = Array2::from_elem((samples, 1), Complex64::new(intensity.sqrt(), 0.0));

        let absorbed = layer_absorptance(field.view(), &constants, 1, x_step);
        assert_relative_eq!(absorbed[0], 1.0, epsilon = 1e-12);

        let gxl = exciton_generation(field.view(), &constants, 1);
        let gx = integrate_wavelength(gxl.view(), constants.grid().step());
        let jsc = short_circuit_current(&gx, x_step);
        assert_relative_eq!(jsc, ideal_current(&constants), epsilon = 1e-12, max_relative = 1e-12);
    }

    #[test]
    fn test_no_field_no_current() {
        let constants = single_wavelength_constants(0.1);
        let field = Array2::<Complex64>::zeros((4, 1));
        let gxl = exciton_generation(field.view(), &constants, 1);
        let gx = integrate_wavelength(gxl.view(), 1.0);
        assert_eq!(short_circuit_current(&gx, 5.0), 0.0);
    }

    #[test]
    fn test_ideal_current_of_flat_spectrum() {
        // 0.1 mW cm⁻² nm⁻¹ at 500 nm over 1 nm
        let constants = single_wavelength_constants(0.1);
        let expected = 0.1e-3 / photon_energy_joules(500.0) * SI::ELEMENTARY_CHARGE * 1e3;
        assert_relative_eq!(ideal_current(&constants), expected, epsilon = 1e-15);
        assert_relative_eq!(ideal_current(&constants), 0.04033, epsilon = 1e-4);
    }
}
