//! Packaging facade used by checkout and shipping-quote workflows.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogError, ContainerCatalog};
use crate::model::{CartItem, Container};
use crate::outcome::{OutcomeBranch, PackagingOutcome};
use crate::selector::{SelectionEvent, SizingConfig, select_best_with_progress};

/// Failure of a packaging computation.
///
/// An empty catalog or a load that fits nowhere are outcomes, not errors.
#[derive(Debug, Error)]
pub enum PackagingError {
    #[error("container catalog unavailable: {0}")]
    CatalogUnavailable(#[from] CatalogError),
}

/// Fetches the catalog once per call and runs the pure selection on it.
#[derive(Clone)]
pub struct PackagingService {
    catalog: Arc<dyn ContainerCatalog>,
    config: SizingConfig,
}

impl PackagingService {
    pub fn new(catalog: Arc<dyn ContainerCatalog>, config: SizingConfig) -> Self {
        Self { catalog, config }
    }

    /// Lists the active containers, propagating catalog failures.
    pub async fn active_containers(&self) -> Result<Vec<Container>, PackagingError> {
        match self.catalog.list_active().await {
            Ok(containers) => Ok(containers),
            Err(err) => {
                warn!(catalog = %self.catalog.describe(), error = %err, "❌ Catalog read failed");
                Err(PackagingError::CatalogUnavailable(err))
            }
        }
    }

    /// Computes the packaging decision for the items.
    pub async fn compute_packaging(
        &self,
        items: &[CartItem],
    ) -> Result<PackagingOutcome, PackagingError> {
        let catalog = self.active_containers().await?;
        Ok(self.compute_with_catalog(items, &catalog, |_| {}))
    }

    /// Runs the selection on an already fetched catalog, reporting progress.
    pub fn compute_with_catalog(
        &self,
        items: &[CartItem],
        catalog: &[Container],
        mut on_event: impl FnMut(&SelectionEvent),
    ) -> PackagingOutcome {
        if catalog.is_empty() {
            info!("ℹ️ No active containers configured, using synthesized default packaging");
        }

        let outcome = select_best_with_progress(items, catalog, &self.config, |evt| {
            if let SelectionEvent::CandidateEvaluated {
                container_id,
                reason_text,
                ..
            } = evt
            {
                debug!(container = %container_id, "{}", reason_text);
            }
            on_event(evt);
        });

        match outcome.branch {
            OutcomeBranch::Oversize => warn!(
                container = outcome.container_id().unwrap_or_default(),
                total_weight = outcome.debug.total_weight,
                total_volume = outcome.debug.total_volume,
                "⚠️ No container fits the load, returning best-effort oversize packaging"
            ),
            OutcomeBranch::BestFit | OutcomeBranch::SynthesizedDefault => debug!(
                container = outcome.container_id().unwrap_or_default(),
                utilization = outcome.debug.utilization_percent,
                "📦 Packaging selected"
            ),
        }
        outcome
    }
}
