//! Container selection for a consolidated order.
//!
//! Every catalog container is tested against the consolidated load; the
//! fitting ones are ranked by:
//! - cost (cheapest first)
//! - interior volume (smallest first)
//! - catalog order (first listed wins remaining ties)
//!
//! Three mutually exclusive branches exist: an empty catalog yields a
//! synthesized default container, a catalog without any fitting container
//! yields the largest container widened to the load (`success = false`), and
//! otherwise the best ranked container is returned.

use std::cmp::Ordering;

use serde::Serialize;

use crate::consolidate::{ConsolidatedFootprint, consolidate};
use crate::fit::{DEFAULT_VOLUME_TOLERANCE, FitVerdict, fits_with_tolerance};
use crate::model::{CartItem, Container, ContainerKind};
use crate::outcome::{
    ContainerSnapshot, ItemEcho, OutcomeBranch, PackagingDebug, PackagingOutcome,
    utilization_percent,
};
use crate::types::{Vec3, Weighted};
use crate::weight::{
    CUBIC_DENSITY_FACTOR, VOLUMETRIC_DIVISOR, chargeable_weight, cubic_weight_with_density,
    volumetric_weight_with_divisor,
};

pub const DEFAULT_CONTAINER_ID: &str = "default";
pub const REASON_NO_CATALOG: &str = "no catalog available, using synthesized default";
pub const REASON_NOTHING_FITS: &str = "no catalog container accommodates the load";

/// Tunables of the sizing engine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SizingConfig {
    /// Share of interior volume a load may fill to fit by volume alone (0..=1)
    pub volume_tolerance: f64,
    /// Margin added per axis when widening an oversize container (cm)
    pub oversize_margin: f64,
    /// Margin added per axis around the load for the default container (cm)
    pub default_margin: f64,
    /// Packaging material weight of the default container (kg)
    pub default_packaging_weight: f64,
    /// Placeholder utilization reported for the default container (percent)
    pub default_utilization: u32,
    /// Carrier divisor for volumetric weight (cm³ per kg)
    pub volumetric_divisor: f64,
    /// Density factor for cubic weight (kg per m³)
    pub cubic_density: f64,
}

impl SizingConfig {
    pub const DEFAULT_VOLUME_TOLERANCE: f64 = DEFAULT_VOLUME_TOLERANCE;
    pub const DEFAULT_OVERSIZE_MARGIN: f64 = 2.0;
    pub const DEFAULT_DEFAULT_MARGIN: f64 = 4.0;
    pub const DEFAULT_PACKAGING_WEIGHT: f64 = 0.1;
    pub const DEFAULT_UTILIZATION: u32 = 80;
    pub const DEFAULT_VOLUMETRIC_DIVISOR: f64 = VOLUMETRIC_DIVISOR;
    pub const DEFAULT_CUBIC_DENSITY: f64 = CUBIC_DENSITY_FACTOR;

    /// Creates a builder for a custom configuration.
    pub fn builder() -> SizingConfigBuilder {
        SizingConfigBuilder::default()
    }
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            volume_tolerance: Self::DEFAULT_VOLUME_TOLERANCE,
            oversize_margin: Self::DEFAULT_OVERSIZE_MARGIN,
            default_margin: Self::DEFAULT_DEFAULT_MARGIN,
            default_packaging_weight: Self::DEFAULT_PACKAGING_WEIGHT,
            default_utilization: Self::DEFAULT_UTILIZATION,
            volumetric_divisor: Self::DEFAULT_VOLUMETRIC_DIVISOR,
            cubic_density: Self::DEFAULT_CUBIC_DENSITY,
        }
    }
}

/// Builder for SizingConfig.
#[derive(Clone, Debug, Default)]
pub struct SizingConfigBuilder {
    config: SizingConfig,
}

impl SizingConfigBuilder {
    pub fn volume_tolerance(mut self, ratio: f64) -> Self {
        self.config.volume_tolerance = ratio;
        self
    }

    pub fn oversize_margin(mut self, margin: f64) -> Self {
        self.config.oversize_margin = margin;
        self
    }

    pub fn default_margin(mut self, margin: f64) -> Self {
        self.config.default_margin = margin;
        self
    }

    pub fn default_packaging_weight(mut self, weight: f64) -> Self {
        self.config.default_packaging_weight = weight;
        self
    }

    pub fn volumetric_divisor(mut self, divisor: f64) -> Self {
        self.config.volumetric_divisor = divisor;
        self
    }

    pub fn cubic_density(mut self, density: f64) -> Self {
        self.config.cubic_density = density;
        self
    }

    pub fn build(self) -> SizingConfig {
        self.config
    }
}

/// Steps of a selection run, emitted for live progress streams.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum SelectionEvent {
    /// Items were consolidated into one load.
    Consolidated {
        items: usize,
        footprint: ConsolidatedFootprint,
    },
    /// One catalog container was tested.
    CandidateEvaluated {
        container_id: String,
        fits: bool,
        reason_code: String,
        reason_text: String,
    },
    /// Selection finished.
    Finished {
        branch: OutcomeBranch,
        container_id: Option<String>,
        success: bool,
    },
    /// The full decision, always the last event of a run.
    Outcome { outcome: Box<PackagingOutcome> },
}

/// Chooses the best container for the items with the default configuration.
///
/// # Parameters
/// * `items` - Order lines to ship
/// * `catalog` - Active containers, in catalog order
pub fn select_best(items: &[CartItem], catalog: &[Container]) -> PackagingOutcome {
    select_best_with_config(items, catalog, &SizingConfig::default())
}

/// Like `select_best`, with custom tunables.
pub fn select_best_with_config(
    items: &[CartItem],
    catalog: &[Container],
    config: &SizingConfig,
) -> PackagingOutcome {
    select_best_with_progress(items, catalog, config, |_| {})
}

/// Selection with a progress callback for every step.
pub fn select_best_with_progress(
    items: &[CartItem],
    catalog: &[Container],
    config: &SizingConfig,
    mut on_event: impl FnMut(&SelectionEvent),
) -> PackagingOutcome {
    let footprint = consolidate(items);
    on_event(&SelectionEvent::Consolidated {
        items: items.len(),
        footprint,
    });

    let outcome = if catalog.is_empty() {
        default_outcome(items, &footprint, config)
    } else {
        let mut fitting: Vec<(&Container, FitVerdict)> = Vec::new();
        for container in catalog {
            let verdict = fits_with_tolerance(&footprint, container, config.volume_tolerance);
            on_event(&SelectionEvent::CandidateEvaluated {
                container_id: container.id.clone(),
                fits: verdict.fits(),
                reason_code: verdict.code().to_string(),
                reason_text: verdict.to_string(),
            });
            if verdict.fits() {
                fitting.push((container, verdict));
            }
        }

        match rank_best(&fitting) {
            Some((container, verdict)) => {
                best_fit_outcome(items, &footprint, container, verdict, fitting.len(), config)
            }
            None => oversize_outcome(items, &footprint, largest_container(catalog), config),
        }
    };

    on_event(&SelectionEvent::Finished {
        branch: outcome.branch,
        container_id: outcome.container_id().map(str::to_string),
        success: outcome.success,
    });
    on_event(&SelectionEvent::Outcome {
        outcome: Box::new(outcome.clone()),
    });
    outcome
}

/// Describes a default container around the load, for an empty catalog.
pub fn synthesize_default(items: &[CartItem]) -> PackagingOutcome {
    synthesize_default_with_config(items, &SizingConfig::default())
}

/// Like `synthesize_default`, with custom tunables.
pub fn synthesize_default_with_config(
    items: &[CartItem],
    config: &SizingConfig,
) -> PackagingOutcome {
    default_outcome(items, &consolidate(items), config)
}

fn compare_candidates(a: &Container, b: &Container) -> Ordering {
    a.cost
        .partial_cmp(&b.cost)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            a.interior_volume()
                .partial_cmp(&b.interior_volume())
                .unwrap_or(Ordering::Equal)
        })
}

/// Cheapest, then smallest; `min_by` keeps the first of equal candidates.
fn rank_best<'a>(fitting: &'a [(&'a Container, FitVerdict)]) -> Option<(&'a Container, &'a FitVerdict)> {
    fitting
        .iter()
        .min_by(|(a, _), (b, _)| compare_candidates(a, b))
        .map(|(container, verdict)| (*container, verdict))
}

/// Largest interior volume; the first listed wins ties.
fn largest_container(catalog: &[Container]) -> &Container {
    let mut largest = &catalog[0];
    for container in &catalog[1..] {
        if container.interior_volume() > largest.interior_volume() {
            largest = container;
        }
    }
    largest
}

struct SnapshotSource<'a> {
    id: &'a str,
    name: &'a str,
    code: &'a str,
    kind: ContainerKind,
    exterior: Vec3,
    container_weight: f64,
    cost: f64,
}

fn snapshot(
    source: SnapshotSource<'_>,
    footprint: &ConsolidatedFootprint,
    config: &SizingConfig,
) -> ContainerSnapshot {
    let exterior = source.exterior;
    let total_weight = footprint.weight + source.container_weight;
    let volumetric = volumetric_weight_with_divisor(
        exterior.x,
        exterior.y,
        exterior.z,
        config.volumetric_divisor,
    );

    ContainerSnapshot {
        id: source.id.to_string(),
        name: source.name.to_string(),
        code: source.code.to_string(),
        kind: source.kind,
        length: exterior.x,
        width: exterior.y,
        height: exterior.z,
        total_weight,
        container_weight: source.container_weight,
        product_weight: footprint.weight,
        container_cost: source.cost,
        volumetric_weight: volumetric,
        cubic_weight: cubic_weight_with_density(exterior.volume(), config.cubic_density),
        chargeable_weight: chargeable_weight(total_weight, volumetric),
    }
}

fn from_container(container: &Container, exterior: Vec3) -> SnapshotSource<'_> {
    SnapshotSource {
        id: &container.id,
        name: &container.name,
        code: &container.code,
        kind: container.kind,
        exterior,
        container_weight: container.weight(),
        cost: container.cost,
    }
}

fn echo_items(items: &[CartItem]) -> Vec<ItemEcho> {
    items.iter().map(ItemEcho::from_item).collect()
}

fn best_fit_outcome(
    items: &[CartItem],
    footprint: &ConsolidatedFootprint,
    container: &Container,
    verdict: &FitVerdict,
    fitting_count: usize,
    config: &SizingConfig,
) -> PackagingOutcome {
    let box_volume = container.interior_volume();
    let reason = format!(
        "selected {} ({}) out of {} fitting container(s): {}",
        container.name, container.code, fitting_count, verdict
    );

    PackagingOutcome {
        success: true,
        branch: OutcomeBranch::BestFit,
        container: Some(snapshot(
            from_container(container, container.exterior_dims()),
            footprint,
            config,
        )),
        items: echo_items(items),
        debug: PackagingDebug::new(
            footprint,
            box_volume,
            utilization_percent(footprint.volume, box_volume),
            reason,
        ),
    }
}

fn oversize_outcome(
    items: &[CartItem],
    footprint: &ConsolidatedFootprint,
    container: &Container,
    config: &SizingConfig,
) -> PackagingOutcome {
    let box_volume = container.interior_volume();
    let exterior = container
        .exterior_dims()
        .max(&footprint.dims().grow(config.oversize_margin));

    PackagingOutcome {
        success: false,
        branch: OutcomeBranch::Oversize,
        container: Some(snapshot(from_container(container, exterior), footprint, config)),
        items: echo_items(items),
        debug: PackagingDebug::new(
            footprint,
            box_volume,
            utilization_percent(footprint.volume, box_volume),
            REASON_NOTHING_FITS,
        ),
    }
}

fn default_outcome(
    items: &[CartItem],
    footprint: &ConsolidatedFootprint,
    config: &SizingConfig,
) -> PackagingOutcome {
    let exterior = footprint.dims().grow(config.default_margin);
    let source = SnapshotSource {
        id: DEFAULT_CONTAINER_ID,
        name: "Default packaging",
        code: "DEFAULT",
        kind: ContainerKind::Box,
        exterior,
        container_weight: config.default_packaging_weight,
        cost: 0.0,
    };

    PackagingOutcome {
        success: true,
        branch: OutcomeBranch::SynthesizedDefault,
        container: Some(snapshot(source, footprint, config)),
        items: echo_items(items),
        debug: PackagingDebug::new(
            footprint,
            footprint.dims().volume(),
            config.default_utilization,
            REASON_NO_CATALOG,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EPSILON_GENERAL;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn box_with(
        id: &str,
        interior: (f64, f64, f64),
        max_weight: f64,
        cost: f64,
    ) -> Container {
        Container::new(id, interior, interior, max_weight, cost).unwrap()
    }

    fn one_item(weight: f64, dims: (f64, f64, f64)) -> Vec<CartItem> {
        vec![CartItem::new("item-1", 1, weight, dims)]
    }

    #[test]
    fn empty_catalog_synthesizes_default_container() {
        let outcome = select_best(&one_item(1.0, (20.0, 15.0, 10.0)), &[]);

        assert!(outcome.success);
        assert_eq!(outcome.branch, OutcomeBranch::SynthesizedDefault);
        let container = outcome.container.as_ref().expect("default container missing");
        assert_eq!(container.id, DEFAULT_CONTAINER_ID);
        assert_eq!((container.length, container.width, container.height), (24.0, 19.0, 14.0));
        assert!(approx(container.container_weight, 0.1));
        assert!(approx(container.total_weight, 1.1));
        assert_eq!(container.container_cost, 0.0);
        assert_eq!(outcome.debug.utilization_percent, 80);
        assert_eq!(outcome.debug.reason, REASON_NO_CATALOG);
    }

    #[test]
    fn synthesize_default_matches_empty_catalog_branch() {
        let items = one_item(1.0, (20.0, 15.0, 10.0));
        assert_eq!(synthesize_default(&items), select_best(&items, &[]));
    }

    #[test]
    fn fitting_box_is_selected_with_volumetric_weight() {
        let catalog = vec![box_with("m", (30.0, 20.0, 20.0), 5.0, 2.0)];
        let outcome = select_best(&one_item(3.0, (25.0, 18.0, 10.0)), &catalog);

        assert!(outcome.success);
        assert_eq!(outcome.branch, OutcomeBranch::BestFit);
        let container = outcome.container.as_ref().unwrap();
        assert_eq!(container.id, "m");
        assert!(approx(container.volumetric_weight, 2.0));
        assert!(approx(container.cubic_weight, 3.6));
        assert!(approx(container.chargeable_weight, 3.0));
        assert_eq!(outcome.debug.box_volume, 12000.0);
        assert_eq!(outcome.debug.utilization_percent, 38);
        assert!(outcome.debug.reason.contains("fits by orientation"));
    }

    #[test]
    fn overweight_load_takes_oversize_branch() {
        let catalog = vec![box_with("m", (30.0, 20.0, 20.0), 5.0, 2.0)];
        let outcome = select_best(&one_item(6.0, (25.0, 18.0, 10.0)), &catalog);

        assert!(!outcome.success);
        assert!(outcome.needs_manual_review());
        assert_eq!(outcome.branch, OutcomeBranch::Oversize);
        assert_eq!(outcome.debug.reason, REASON_NOTHING_FITS);
        let container = outcome.container.as_ref().unwrap();
        assert_eq!(container.id, "m");
        // Exterior is max(container, load + 2 cm) on each axis.
        assert_eq!((container.length, container.width, container.height), (30.0, 20.0, 20.0));
        assert!(container.length >= 25.0 + 2.0);
        assert!(container.width >= 18.0 + 2.0);
        assert!(container.height >= 10.0 + 2.0);
    }

    #[test]
    fn oversize_branch_widens_exterior_to_the_load() {
        let catalog = vec![
            box_with("s", (10.0, 10.0, 10.0), 50.0, 1.0),
            box_with("l", (30.0, 20.0, 20.0), 50.0, 3.0),
        ];
        let outcome = select_best(&one_item(2.0, (40.0, 25.0, 30.0)), &catalog);

        assert_eq!(outcome.branch, OutcomeBranch::Oversize);
        let container = outcome.container.as_ref().unwrap();
        assert_eq!(container.id, "l");
        assert_eq!((container.length, container.width, container.height), (42.0, 27.0, 32.0));
        assert!(approx(container.volumetric_weight, 42.0 * 27.0 * 32.0 / 6000.0));
    }

    #[test]
    fn cheaper_box_wins_regardless_of_size() {
        // A: 10000 cm³ for 3.00, B: 12000 cm³ for 2.00
        let catalog = vec![
            box_with("a", (25.0, 20.0, 20.0), 10.0, 3.0),
            box_with("b", (30.0, 20.0, 20.0), 10.0, 2.0),
        ];
        let outcome = select_best(&one_item(1.0, (15.0, 10.0, 10.0)), &catalog);

        assert_eq!(outcome.container_id(), Some("b"));
    }

    #[test]
    fn smaller_box_wins_on_equal_cost() {
        let catalog = vec![
            box_with("large", (40.0, 30.0, 30.0), 10.0, 2.0),
            box_with("small", (20.0, 20.0, 20.0), 10.0, 2.0),
        ];
        let outcome = select_best(&one_item(1.0, (15.0, 10.0, 10.0)), &catalog);

        assert_eq!(outcome.container_id(), Some("small"));
    }

    #[test]
    fn catalog_order_breaks_full_ties() {
        let catalog = vec![
            box_with("first", (20.0, 20.0, 20.0), 10.0, 2.0),
            box_with("second", (20.0, 20.0, 20.0), 10.0, 2.0),
        ];
        let outcome = select_best(&one_item(1.0, (15.0, 10.0, 10.0)), &catalog);

        assert_eq!(outcome.container_id(), Some("first"));
    }

    #[test]
    fn largest_container_ties_keep_catalog_order() {
        let catalog = vec![
            box_with("first", (20.0, 20.0, 20.0), 1.0, 2.0),
            box_with("second", (20.0, 20.0, 20.0), 1.0, 1.0),
        ];
        let outcome = select_best(&one_item(9.0, (5.0, 5.0, 5.0)), &catalog);

        assert_eq!(outcome.branch, OutcomeBranch::Oversize);
        assert_eq!(outcome.container_id(), Some("first"));
    }

    #[test]
    fn volume_tolerance_admits_reorganizable_load() {
        // Stacked height 40 cm fails every orientation; 10200 cm³ is 85% of 12000 cm³.
        let items = vec![CartItem::new("flat", 4, 0.5, (15.0, 17.0, 10.0))];
        let catalog = vec![box_with("m", (30.0, 20.0, 20.0), 5.0, 2.0)];
        let outcome = select_best(&items, &catalog);

        assert!(outcome.success);
        assert_eq!(outcome.branch, OutcomeBranch::BestFit);
        assert!(outcome.debug.reason.contains("fits by volume"));
        assert_eq!(outcome.debug.utilization_percent, 85);
    }

    #[test]
    fn empty_items_pick_cheapest_container() {
        let catalog = vec![
            box_with("a", (20.0, 20.0, 20.0), 10.0, 2.5),
            box_with("b", (30.0, 20.0, 20.0), 10.0, 1.5),
        ];
        let outcome = select_best(&[], &catalog);

        assert!(outcome.success);
        assert_eq!(outcome.container_id(), Some("b"));
        assert!(outcome.items.is_empty());
        assert_eq!(outcome.debug.utilization_percent, 0);
    }

    #[test]
    fn container_empty_weight_is_added_to_total() {
        let catalog = vec![
            box_with("m", (30.0, 20.0, 20.0), 5.0, 2.0)
                .with_empty_weight(0.25)
                .with_meta("Medium box", "BOX-M", ContainerKind::Box),
        ];
        let outcome = select_best(&one_item(3.0, (25.0, 18.0, 10.0)), &catalog);
        let container = outcome.container.as_ref().unwrap();

        assert!(approx(container.container_weight, 0.25));
        assert!(approx(container.product_weight, 3.0));
        assert!(approx(container.total_weight, 3.25));
        assert_eq!(container.code, "BOX-M");
        assert!(outcome.debug.reason.contains("Medium box"));
    }

    #[test]
    fn custom_divisor_changes_volumetric_weight() {
        let config = SizingConfig::builder().volumetric_divisor(5000.0).build();
        let catalog = vec![box_with("m", (30.0, 20.0, 20.0), 5.0, 2.0)];
        let outcome = select_best_with_config(&one_item(1.0, (25.0, 18.0, 10.0)), &catalog, &config);

        assert!(approx(outcome.container.unwrap().volumetric_weight, 2.4));
    }

    #[test]
    fn branches_are_mutually_exclusive() {
        let fitting = vec![box_with("m", (30.0, 20.0, 20.0), 5.0, 2.0)];
        let tiny = vec![box_with("t", (5.0, 5.0, 5.0), 5.0, 2.0)];
        let items = one_item(3.0, (25.0, 18.0, 10.0));

        let cases = [
            (select_best(&items, &[]), OutcomeBranch::SynthesizedDefault, true),
            (select_best(&items, &fitting), OutcomeBranch::BestFit, true),
            (select_best(&items, &tiny), OutcomeBranch::Oversize, false),
        ];
        for (outcome, branch, success) in cases {
            assert_eq!(outcome.branch, branch);
            assert_eq!(outcome.success, success);
            assert!(outcome.container.is_some());
        }
    }

    #[test]
    fn selection_is_idempotent() {
        let items = vec![
            CartItem::new("a", 2, 0.8, (12.0, 9.0, 4.0)),
            CartItem::new("b", 1, 1.1, (20.0, 14.0, 6.0)),
        ];
        let catalog = vec![
            box_with("s", (20.0, 15.0, 10.0), 5.0, 1.2),
            box_with("m", (30.0, 20.0, 20.0), 5.0, 2.0),
        ];

        assert_eq!(select_best(&items, &catalog), select_best(&items, &catalog));
    }

    #[test]
    fn progress_reports_every_candidate() {
        let catalog = vec![
            box_with("t", (5.0, 5.0, 5.0), 5.0, 1.0),
            box_with("m", (30.0, 20.0, 20.0), 5.0, 2.0),
        ];
        let mut events = Vec::new();
        let outcome = select_best_with_progress(
            &one_item(3.0, (25.0, 18.0, 10.0)),
            &catalog,
            &SizingConfig::default(),
            |evt| events.push(evt.clone()),
        );

        assert_eq!(events.len(), 5);
        assert!(matches!(events[0], SelectionEvent::Consolidated { items: 1, .. }));
        assert!(matches!(
            &events[1],
            SelectionEvent::CandidateEvaluated { container_id, fits: false, .. } if container_id == "t"
        ));
        assert!(matches!(
            &events[2],
            SelectionEvent::CandidateEvaluated { container_id, fits: true, .. } if container_id == "m"
        ));
        match &events[3] {
            SelectionEvent::Finished {
                branch,
                container_id,
                success,
            } => {
                assert_eq!(*branch, outcome.branch);
                assert_eq!(container_id.as_deref(), Some("m"));
                assert!(*success);
            }
            other => panic!("unexpected finish event: {:?}", other),
        }
        assert_eq!(
            events[4],
            SelectionEvent::Outcome {
                outcome: Box::new(outcome.clone())
            }
        );
    }

    #[test]
    fn container_with_unbounded_payload_is_never_selected() {
        let mut broken = box_with("m", (30.0, 20.0, 20.0), 5.0, 2.0);
        broken.max_weight = f64::NAN;
        let outcome = select_best(&one_item(500.0, (10.0, 10.0, 10.0)), &[broken]);

        assert!(!outcome.success);
        assert_eq!(outcome.branch, OutcomeBranch::Oversize);
    }

    #[test]
    fn default_exterior_never_smaller_than_load_plus_margin() {
        let items = vec![
            CartItem::new("a", 3, 0.2, (7.5, 3.0, 1.5)),
            CartItem {
                id: "b".into(),
                quantity: 2,
                ..CartItem::default()
            },
        ];
        let footprint = consolidate(&items);
        let outcome = select_best(&items, &[]);
        let container = outcome.container.unwrap();

        assert!(container.length + EPSILON_GENERAL >= footprint.length + 4.0);
        assert!(container.width + EPSILON_GENERAL >= footprint.width + 4.0);
        assert!(container.height + EPSILON_GENERAL >= footprint.height + 4.0);
    }
}
