//! Physical constants and unit conversions used by the generation integral

/// Constants in SI units
///
/// CODATA 2010 values.
pub struct SI {}

impl SI {
    /// Planck's constant
    /// Units: J⋅s
    pub const PLANCK_CONSTANT: f64 = 6.62606957e-34;

    /// Speed of light in vacuum
    /// Units: m/s
    pub const SPEED_OF_LIGHT: f64 = 2.99792458e8;

    /// Elementary charge
    /// Units: C
    pub const ELEMENTARY_CHARGE: f64 = 1.60217657e-19;
}

/// Nanometers to centimeters
pub const NM_TO_CM: f64 = 1.0e-7;

/// Nanometers to meters
pub const NM_TO_M: f64 = 1.0e-9;

/// Spectral irradiance in mW cm⁻² nm⁻¹ to W cm⁻² nm⁻¹
pub const MILLIWATT_TO_WATT: f64 = 1.0e-3;

/// Amperes to milliamperes
pub const AMP_TO_MILLIAMP: f64 = 1.0e3;

/// Energy of a single photon at the given wavelength
///
/// # Arguments
///
/// * `wavelength_nm` - Wavelength in nanometers
///
/// # Returns
///
/// Photon energy in joules
pub fn photon_energy_joules(wavelength_nm: f64) -> f64 {
    SI::PLANCK_CONSTANT * SI::SPEED_OF_LIGHT / (wavelength_nm * NM_TO_M)
}
