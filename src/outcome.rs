//! Result structures returned to checkout and quoting workflows.
//!
//! The outcome is a flat record: one selected container snapshot, the item
//! echo list and a debug block.

use serde::Serialize;
use utoipa::ToSchema;

use crate::consolidate::{ConsolidatedFootprint, normalize_item};
use crate::model::{CartItem, ContainerKind};

/// Which of the three mutually exclusive selection paths produced an outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeBranch {
    /// The catalog was empty; a default container was described.
    SynthesizedDefault,
    /// At least one catalog container fits; the best ranked one was chosen.
    BestFit,
    /// Nothing fits; the largest catalog container is returned, widened to the load.
    Oversize,
}

/// Snapshot of the chosen container with derived shipping weights.
///
/// `length`, `width` and `height` are exterior dimensions in cm.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct ContainerSnapshot {
    pub id: String,
    pub name: String,
    pub code: String,
    pub kind: ContainerKind,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    /// Product weight plus container weight.
    pub total_weight: f64,
    pub container_weight: f64,
    pub product_weight: f64,
    pub container_cost: f64,
    pub volumetric_weight: f64,
    pub cubic_weight: f64,
    /// Larger of total and volumetric weight.
    pub chargeable_weight: f64,
}

/// Echo of one request item after default substitution.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct ItemEcho {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    /// Unit weight in kg.
    pub weight: f64,
    /// Unit size as `LxWxH` in cm.
    pub dimensions: String,
}

impl ItemEcho {
    pub fn from_item(item: &CartItem) -> Self {
        let normalized = normalize_item(item);
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            weight: normalized.weight,
            dimensions: normalized.dims.dimension_string(),
        }
    }
}

/// Debug block explaining the decision.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct PackagingDebug {
    /// Summed item volume in cm³.
    pub total_volume: f64,
    /// Summed item weight in kg.
    pub total_weight: f64,
    /// Interior volume of the chosen container in cm³.
    pub box_volume: f64,
    pub utilization_percent: u32,
    pub reason: String,
}

impl PackagingDebug {
    pub fn new(
        footprint: &ConsolidatedFootprint,
        box_volume: f64,
        utilization_percent: u32,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            total_volume: footprint.volume,
            total_weight: footprint.weight,
            box_volume,
            utilization_percent,
            reason: reason.into(),
        }
    }
}

/// Final packaging decision for one order.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct PackagingOutcome {
    /// `false` means "ship with the returned container but flag for manual review".
    pub success: bool,
    pub branch: OutcomeBranch,
    pub container: Option<ContainerSnapshot>,
    pub items: Vec<ItemEcho>,
    pub debug: PackagingDebug,
}

impl PackagingOutcome {
    /// Id of the chosen container, if any.
    pub fn container_id(&self) -> Option<&str> {
        self.container.as_ref().map(|c| c.id.as_str())
    }

    /// Whether the caller should route the order to manual packing review.
    pub fn needs_manual_review(&self) -> bool {
        !self.success
    }
}

/// Rounded share of `box_volume` used by `volume`, in percent.
pub fn utilization_percent(volume: f64, box_volume: f64) -> u32 {
    if box_volume <= 0.0 || !box_volume.is_finite() {
        return 0;
    }
    (volume / box_volume * 100.0).round().max(0.0) as u32
}
