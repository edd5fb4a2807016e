//! Reduces an order's items to one aggregate footprint.
//!
//! Items are modelled as laid side by side on their largest plane and stacked
//! vertically: the footprint takes the largest item length and width and the
//! summed height of every unit. This over-estimates the space a real packer
//! would need but never under-estimates it.

use serde::Serialize;

use crate::model::CartItem;
use crate::types::{Dimensional, Vec3, Weighted};

/// Unit weight substituted for missing or unusable item weights (kg).
pub const DEFAULT_ITEM_WEIGHT: f64 = 0.1;
/// Unit length and width substituted for missing item sizes (cm).
pub const DEFAULT_ITEM_SIDE: f64 = 10.0;
/// Unit height substituted for missing item heights (cm).
pub const DEFAULT_ITEM_HEIGHT: f64 = 5.0;

/// An item after default substitution; every value is positive and finite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedItem {
    pub quantity: u32,
    pub weight: f64,
    pub dims: Vec3,
}

impl Dimensional for NormalizedItem {
    fn dimensions(&self) -> Vec3 {
        self.dims
    }
}

impl Weighted for NormalizedItem {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Aggregate weight and size of a whole order treated as one object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ConsolidatedFootprint {
    pub weight: f64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub volume: f64,
}

impl ConsolidatedFootprint {
    /// Bounding dimensions (length, width, stacked height).
    #[inline]
    pub fn dims(&self) -> Vec3 {
        Vec3::new(self.length, self.width, self.height)
    }
}

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Applies the default policy for incomplete catalog records.
///
/// Missing, zero, negative or non-finite values are replaced; the item is
/// never rejected.
pub fn normalize_item(item: &CartItem) -> NormalizedItem {
    NormalizedItem {
        quantity: item.quantity,
        weight: usable(item.weight).unwrap_or(DEFAULT_ITEM_WEIGHT),
        dims: Vec3::new(
            usable(item.length).unwrap_or(DEFAULT_ITEM_SIDE),
            usable(item.width).unwrap_or(DEFAULT_ITEM_SIDE),
            usable(item.height).unwrap_or(DEFAULT_ITEM_HEIGHT),
        ),
    }
}

/// Consolidates items into one footprint.
///
/// Empty input (or only zero-quantity lines) yields an all-zero footprint.
pub fn consolidate(items: &[CartItem]) -> ConsolidatedFootprint {
    items
        .iter()
        .map(normalize_item)
        .filter(|item| item.quantity > 0)
        .fold(ConsolidatedFootprint::default(), |mut acc, item| {
            let quantity = f64::from(item.quantity);
            acc.weight += item.weight() * quantity;
            acc.volume += item.volume() * quantity;
            acc.length = acc.length.max(item.dims.x);
            acc.width = acc.width.max(item.dims.y);
            acc.height += item.dims.z * quantity;
            acc
        })
}
