//! Decides whether a consolidated load fits a catalog container.
//!
//! A container is accepted when the load respects its payload limit and either
//! one of the six axis orientations fits the interior, or the load volume stays
//! within a tolerance share of the interior volume (items that can be
//! rearranged usually pack tighter than their bounding box).

use std::fmt;

use crate::consolidate::ConsolidatedFootprint;
use crate::model::Container;
use crate::types::{EPSILON_GENERAL, Vec3, trim_number};

/// Share of the interior volume a load may occupy to fit by volume alone.
pub const DEFAULT_VOLUME_TOLERANCE: f64 = 0.9;

/// Result of testing one container against a load.
#[derive(Clone, Debug, PartialEq)]
pub enum FitVerdict {
    /// The load fits axis-aligned in the given orientation.
    ByOrientation { orientation: &'static str },
    /// No orientation fits but the volume is within tolerance.
    ByVolume { volume: f64, limit: f64 },
    /// The load is heavier than the container's payload limit.
    TooHeavy { weight: f64, max_weight: f64 },
    /// Neither orientation nor volume tolerance admit the load.
    DimensionsExceed {
        load: Vec3,
        interior: Vec3,
        volume: f64,
        limit: f64,
    },
}

impl FitVerdict {
    /// Whether the container can take the load.
    pub fn fits(&self) -> bool {
        matches!(self, FitVerdict::ByOrientation { .. } | FitVerdict::ByVolume { .. })
    }

    pub fn code(&self) -> &'static str {
        match self {
            FitVerdict::ByOrientation { .. } => "fits_by_orientation",
            FitVerdict::ByVolume { .. } => "fits_by_volume",
            FitVerdict::TooHeavy { .. } => "weight_exceeded",
            FitVerdict::DimensionsExceed { .. } => "dimensions_exceeded",
        }
    }
}

impl fmt::Display for FitVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitVerdict::ByOrientation { orientation } => {
                write!(f, "fits by orientation ({})", orientation)
            }
            FitVerdict::ByVolume { volume, limit } => write!(
                f,
                "fits by volume (reorganizable): {} cm³ <= {} cm³",
                trim_number(*volume),
                trim_number(*limit)
            ),
            FitVerdict::TooHeavy { weight, max_weight } => write!(
                f,
                "weight exceeded: load {} kg > max payload {} kg",
                trim_number(*weight),
                trim_number(*max_weight)
            ),
            FitVerdict::DimensionsExceed {
                load,
                interior,
                volume,
                limit,
            } => write!(
                f,
                "load {} cm does not fit interior {} cm in any orientation ({}); volume {} cm³ > {} cm³",
                load.dimension_string(),
                interior.dimension_string(),
                describe_mismatch(load, interior),
                trim_number(*volume),
                trim_number(*limit)
            ),
        }
    }
}

fn sorted_desc(dims: &Vec3) -> [f64; 3] {
    let mut sides = [dims.x, dims.y, dims.z];
    sides.sort_by(|a, b| b.total_cmp(a));
    sides
}

/// Names every side rank on which the load is larger than the interior.
fn describe_mismatch(load: &Vec3, interior: &Vec3) -> String {
    const RANKS: [&str; 3] = ["longest side", "middle side", "shortest side"];
    let load_sides = sorted_desc(load);
    let interior_sides = sorted_desc(interior);

    let parts: Vec<String> = RANKS
        .iter()
        .zip(load_sides.iter().zip(interior_sides.iter()))
        .filter(|(_, (l, i))| **l > **i + EPSILON_GENERAL)
        .map(|(rank, (l, i))| format!("{} {} > {}", rank, trim_number(*l), trim_number(*i)))
        .collect();

    parts.join(", ")
}

/// Tests a load against a container with the default volume tolerance.
pub fn fits(footprint: &ConsolidatedFootprint, container: &Container) -> FitVerdict {
    fits_with_tolerance(footprint, container, DEFAULT_VOLUME_TOLERANCE)
}

/// Tests a load against a container.
///
/// # Parameters
/// * `footprint` - The consolidated load
/// * `container` - Catalog entry to test
/// * `volume_tolerance` - Share of interior volume accepted as a fallback (0..=1)
pub fn fits_with_tolerance(
    footprint: &ConsolidatedFootprint,
    container: &Container,
    volume_tolerance: f64,
) -> FitVerdict {
    // A non-finite payload limit admits nothing.
    if !container.max_weight.is_finite() || footprint.weight > container.max_weight + EPSILON_GENERAL
    {
        return FitVerdict::TooHeavy {
            weight: footprint.weight,
            max_weight: container.max_weight,
        };
    }

    let interior = container.interior_dims();
    let load = footprint.dims();

    if let Some(orientation) = load
        .orientations()
        .into_iter()
        .find(|o| o.dims.fits_within(&interior, EPSILON_GENERAL))
    {
        return FitVerdict::ByOrientation {
            orientation: orientation.label,
        };
    }

    let limit = volume_tolerance * interior.volume();
    if footprint.volume <= limit + EPSILON_GENERAL {
        return FitVerdict::ByVolume {
            volume: footprint.volume,
            limit,
        };
    }

    FitVerdict::DimensionsExceed {
        load,
        interior,
        volume: footprint.volume,
        limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footprint(weight: f64, dims: (f64, f64, f64), volume: f64) -> ConsolidatedFootprint {
        ConsolidatedFootprint {
            weight,
            length: dims.0,
            width: dims.1,
            height: dims.2,
            volume,
        }
    }

    fn box_30_20_20() -> Container {
        Container::new("m", (30.0, 20.0, 20.0), (30.0, 20.0, 20.0), 5.0, 2.0).unwrap()
    }

    #[test]
    fn rejects_on_weight_before_dimensions() {
        let verdict = fits(&footprint(6.0, (1.0, 1.0, 1.0), 1.0), &box_30_20_20());
        assert!(!verdict.fits());
        assert_eq!(verdict.code(), "weight_exceeded");
        let reason = verdict.to_string();
        assert!(reason.contains("6 kg"), "{reason}");
        assert!(reason.contains("5 kg"), "{reason}");
    }

    #[test]
    fn weight_at_limit_is_accepted() {
        let verdict = fits(&footprint(5.0, (25.0, 18.0, 10.0), 4500.0), &box_30_20_20());
        assert!(verdict.fits());
    }

    #[test]
    fn identity_orientation_is_tried_first() {
        let verdict = fits(&footprint(3.0, (25.0, 18.0, 10.0), 4500.0), &box_30_20_20());
        assert_eq!(verdict, FitVerdict::ByOrientation { orientation: "LWH" });
        assert!(verdict.to_string().starts_with("fits by orientation"));
    }

    #[test]
    fn rotated_load_fits_by_orientation() {
        // Tall stack lies down along the container length.
        let verdict = fits(&footprint(1.0, (18.0, 10.0, 28.0), 5040.0), &box_30_20_20());
        assert_eq!(verdict, FitVerdict::ByOrientation { orientation: "HLW" });
    }

    #[test]
    fn falls_back_to_volume_tolerance() {
        // 85% of 12000 cm³, but the stacked height exceeds every interior side.
        let verdict = fits(&footprint(2.0, (15.0, 10.0, 40.0), 10_200.0), &box_30_20_20());
        assert!(verdict.fits());
        assert_eq!(verdict.code(), "fits_by_volume");
        assert!(verdict.to_string().starts_with("fits by volume"));
    }

    #[test]
    fn reports_exact_mismatch_when_nothing_fits() {
        let verdict = fits(&footprint(2.0, (25.0, 18.0, 40.0), 11_000.0), &box_30_20_20());
        assert!(!verdict.fits());
        assert_eq!(verdict.code(), "dimensions_exceeded");
        let reason = verdict.to_string();
        assert!(reason.contains("25x18x40"), "{reason}");
        assert!(reason.contains("longest side 40 > 30"), "{reason}");
        assert!(reason.contains("middle side 25 > 20"), "{reason}");
        assert!(!reason.contains("shortest side"), "{reason}");
    }

    #[test]
    fn custom_tolerance_is_respected() {
        let load = footprint(2.0, (15.0, 10.0, 40.0), 10_200.0);
        assert!(!fits_with_tolerance(&load, &box_30_20_20(), 0.8).fits());
        assert!(fits_with_tolerance(&load, &box_30_20_20(), 0.9).fits());
    }

    #[test]
    fn non_finite_payload_limit_rejects_any_load() {
        let load = footprint(500.0, (10.0, 10.0, 10.0), 1_000.0);
        for limit in [f64::NAN, f64::INFINITY] {
            let mut container = box_30_20_20();
            container.max_weight = limit;
            let verdict = fits(&load, &container);
            assert!(!verdict.fits());
            assert_eq!(verdict.code(), "weight_exceeded");
        }
    }
}
