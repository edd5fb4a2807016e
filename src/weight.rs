//! Carrier weight formulas.
//!
//! All inputs are centimeters and kilograms.

/// Divisor of the reference carrier for volumetric weight (cm³ per kg).
pub const VOLUMETRIC_DIVISOR: f64 = 6000.0;

/// Density factor applied to cubic meters for cubic weight (kg per m³).
pub const CUBIC_DENSITY_FACTOR: f64 = 300.0;

const CM3_PER_M3: f64 = 1_000_000.0;

/// Volumetric weight of a parcel with the reference divisor.
///
/// # Examples
/// ```
/// use cartonize::weight::volumetric_weight;
///
/// assert_eq!(volumetric_weight(30.0, 20.0, 20.0), 2.0);
/// ```
pub fn volumetric_weight(length: f64, width: f64, height: f64) -> f64 {
    volumetric_weight_with_divisor(length, width, height, VOLUMETRIC_DIVISOR)
}

/// Volumetric weight for carriers with a different divisor.
pub fn volumetric_weight_with_divisor(length: f64, width: f64, height: f64, divisor: f64) -> f64 {
    (length * width * height) / divisor
}

/// Cubic weight of a volume with the reference density factor.
pub fn cubic_weight(volume_cm3: f64) -> f64 {
    cubic_weight_with_density(volume_cm3, CUBIC_DENSITY_FACTOR)
}

/// Cubic weight with a custom density factor.
pub fn cubic_weight_with_density(volume_cm3: f64, density: f64) -> f64 {
    (volume_cm3 / CM3_PER_M3) * density
}

/// Weight a carrier bills: the larger of real and volumetric weight.
pub fn chargeable_weight(real: f64, volumetric: f64) -> f64 {
    real.max(volumetric)
}
