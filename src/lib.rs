//! Shipment sizing: picks the shipping container for an order and derives
//! carrier-billable weights.

pub mod api;
pub mod catalog;
pub mod config;
pub mod consolidate;
pub mod fit;
pub mod model;
pub mod outcome;
pub mod selector;
pub mod service;
pub mod types;
pub mod weight;

pub use catalog::{CatalogError, ContainerCatalog};
pub use model::{CartItem, Container};
pub use outcome::PackagingOutcome;
pub use selector::{SizingConfig, select_best, synthesize_default};
pub use service::{PackagingError, PackagingService};
