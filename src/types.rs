//! Common types and traits for parcel geometry.
//!
//! Lengths are centimeters and weights are kilograms throughout the crate.

/// Global numerical tolerance for floating-point comparisons.
///
/// Used for dimension, volume and weight comparisons in the fit checks.
pub const EPSILON_GENERAL: f64 = 1e-6;

/// Represents a 3D extent (length, width, height).
///
/// `x` is the length axis, `y` the width axis and `z` the height axis.
///
/// # Examples
/// ```
/// use cartonize::types::Vec3;
///
/// let load = Vec3::new(20.0, 15.0, 10.0);
/// let padded = load.grow(4.0);
/// assert_eq!(padded, Vec3::new(24.0, 19.0, 14.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Creates a new extent.
    ///
    /// # Parameters
    /// * `x` - Length
    /// * `y` - Width
    /// * `z` - Height
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Calculates the volume (product of all components).
    #[inline]
    pub fn volume(&self) -> f64 {
        self.x * self.y * self.z
    }

    /// Checks if the extent fits within another extent (component-wise <=).
    ///
    /// # Parameters
    /// * `container` - The outer extent (e.g. interior dimensions)
    /// * `tolerance` - Numerical tolerance for the comparison
    #[inline]
    pub fn fits_within(&self, container: &Self, tolerance: f64) -> bool {
        self.x <= container.x + tolerance
            && self.y <= container.y + tolerance
            && self.z <= container.z + tolerance
    }

    /// Component-wise maximum of two extents.
    #[inline]
    pub fn max(&self, other: &Self) -> Self {
        Self::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }

    /// Adds the same margin to every axis.
    #[inline]
    pub fn grow(&self, margin: f64) -> Self {
        Self::new(self.x + margin, self.y + margin, self.z + margin)
    }

    /// All six axis assignments of this extent, starting with the identity.
    pub fn orientations(&self) -> [Orientation; 6] {
        let Self { x, y, z } = *self;
        [
            Orientation::new("LWH", Self::new(x, y, z)),
            Orientation::new("LHW", Self::new(x, z, y)),
            Orientation::new("WLH", Self::new(y, x, z)),
            Orientation::new("WHL", Self::new(y, z, x)),
            Orientation::new("HLW", Self::new(z, x, y)),
            Orientation::new("HWL", Self::new(z, y, x)),
        ]
    }

    /// Human-readable `LxWxH` form with up to two decimals.
    pub fn dimension_string(&self) -> String {
        format!(
            "{}x{}x{}",
            trim_number(self.x),
            trim_number(self.y),
            trim_number(self.z)
        )
    }
}

impl From<(f64, f64, f64)> for Vec3 {
    #[inline]
    fn from(tuple: (f64, f64, f64)) -> Self {
        Self::new(tuple.0, tuple.1, tuple.2)
    }
}

/// One way of laying a load into a container.
///
/// `label` names which load axis goes onto the container's length, width and
/// height axes in that order (`"WLH"` puts the load's width along the
/// container length).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    pub label: &'static str,
    pub dims: Vec3,
}

impl Orientation {
    const fn new(label: &'static str, dims: Vec3) -> Self {
        Self { label, dims }
    }
}

/// Trait for objects with 3D dimensions.
pub trait Dimensional {
    /// Returns the dimensions of the object.
    fn dimensions(&self) -> Vec3;

    /// Calculates the volume.
    fn volume(&self) -> f64 {
        self.dimensions().volume()
    }
}

/// Trait for objects with weight.
pub trait Weighted {
    /// Returns the weight in kg.
    fn weight(&self) -> f64;
}

/// Formats a number with at most two decimals and no trailing zeros.
pub fn trim_number(value: f64) -> String {
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);

        assert_eq!(a.max(&Vec3::new(0.0, 9.0, 3.0)), Vec3::new(1.0, 9.0, 3.0));
        assert_eq!(a.grow(2.0), Vec3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn test_vec3_volume() {
        let dims = Vec3::new(10.0, 20.0, 30.0);
        assert!((dims.volume() - 6000.0).abs() < EPSILON_GENERAL);
    }

    #[test]
    fn test_vec3_fits_within() {
        let small = Vec3::new(5.0, 5.0, 5.0);
        let large = Vec3::new(10.0, 10.0, 10.0);

        assert!(small.fits_within(&large, EPSILON_GENERAL));
        assert!(!large.fits_within(&small, EPSILON_GENERAL));
    }

    #[test]
    fn test_orientations_cover_all_permutations() {
        let dims = Vec3::new(1.0, 2.0, 3.0);
        let orientations = dims.orientations();

        assert_eq!(orientations[0].dims, dims);
        let mut seen: Vec<(f64, f64, f64)> =
            orientations.iter().map(|o| (o.dims.x, o.dims.y, o.dims.z)).collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        seen.dedup();
        assert_eq!(seen.len(), 6);
        for orientation in &orientations {
            assert!((orientation.dims.volume() - 6.0).abs() < EPSILON_GENERAL);
        }
    }

    #[test]
    fn test_dimension_string_trims_zeros() {
        assert_eq!(Vec3::new(20.0, 15.5, 10.25).dimension_string(), "20x15.5x10.25");
        assert_eq!(trim_number(0.0), "0");
        assert_eq!(trim_number(2.999), "3");
    }
}
