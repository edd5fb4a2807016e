//! Data models for shipment sizing.
//!
//! This module defines the input and catalog structures:
//! - `CartItem`: One order line with quantity, unit weight and unit size
//! - `Container`: A shipping container from the catalog
//! - `ContainerKind`: Box, envelope, tube, ...

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{Dimensional, Vec3, Weighted};

/// Validation error for item or container data.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Invalid cost: {0}")]
    InvalidCost(String),
}

fn validate_dimension(value: f64, name: &str) -> Result<(), ValidationError> {
    if value <= 0.0 || !value.is_finite() {
        return Err(ValidationError::InvalidDimension(format!(
            "{} must be positive, got: {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_non_negative_weight(value: f64, name: &str) -> Result<(), ValidationError> {
    if value < 0.0 || !value.is_finite() {
        return Err(ValidationError::InvalidWeight(format!(
            "{} must not be negative, got: {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_dims(dims: Vec3, prefix: &str) -> Result<(), ValidationError> {
    validate_dimension(dims.x, &format!("{prefix} length"))?;
    validate_dimension(dims.y, &format!("{prefix} width"))?;
    validate_dimension(dims.z, &format!("{prefix} height"))?;
    Ok(())
}

/// One order line to be shipped.
///
/// Size and weight are per unit. Missing values are allowed here; the
/// consolidation step substitutes conservative defaults for them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "sku-1001",
    "name": "Ceramic mug",
    "quantity": 2,
    "weight": 0.4,
    "length": 12.0,
    "width": 9.0,
    "height": 10.0
}))]
pub struct CartItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub quantity: u32,
    /// Unit weight in kg.
    #[serde(default)]
    pub weight: Option<f64>,
    /// Unit length in cm.
    #[serde(default)]
    pub length: Option<f64>,
    /// Unit width in cm.
    #[serde(default)]
    pub width: Option<f64>,
    /// Unit height in cm.
    #[serde(default)]
    pub height: Option<f64>,
}

impl CartItem {
    /// Creates a fully specified item.
    pub fn new(
        id: impl Into<String>,
        quantity: u32,
        weight: f64,
        dims: (f64, f64, f64),
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            quantity,
            weight: Some(weight),
            length: Some(dims.0),
            width: Some(dims.1),
            height: Some(dims.2),
        }
    }

    /// Checks the only hard constraint on request data: quantity must be positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.quantity == 0 {
            return Err(ValidationError::InvalidQuantity(format!(
                "Item '{}' must have a quantity of at least 1",
                self.id
            )));
        }
        Ok(())
    }
}

/// Physical kind of a shipping container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    #[default]
    Box,
    Envelope,
    Tube,
    Other,
}

/// A shipping container from the catalog.
///
/// Read-only for the sizing engine.
///
/// # Fields
/// * `interior` - Usable inner length/width/height in cm
/// * `exterior` - Outer shippable length/width/height in cm, never smaller than `interior`
/// * `empty_weight` - Weight of the empty container in kg
/// * `max_weight` - Maximum payload in kg
/// * `priority` - Higher is preferred when the catalog is listed
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct Container {
    pub id: String,
    pub name: String,
    pub code: String,
    pub kind: ContainerKind,
    #[schema(value_type = [f64; 3], example = json!([30.0, 20.0, 20.0]))]
    pub interior: (f64, f64, f64),
    #[schema(value_type = [f64; 3], example = json!([31.0, 21.0, 21.0]))]
    pub exterior: (f64, f64, f64),
    pub empty_weight: f64,
    pub max_weight: f64,
    pub cost: f64,
    pub priority: i32,
}

impl Container {
    /// Creates a new box-type container after validating the parameters.
    ///
    /// # Returns
    /// `Ok(Container)` for valid values, otherwise `Err(ValidationError)`
    ///
    /// # Examples
    /// ```
    /// use cartonize::model::Container;
    ///
    /// let ok = Container::new("s", (30.0, 20.0, 20.0), (31.0, 21.0, 21.0), 5.0, 2.0);
    /// assert!(ok.is_ok());
    ///
    /// let inverted = Container::new("s", (30.0, 20.0, 20.0), (29.0, 21.0, 21.0), 5.0, 2.0);
    /// assert!(inverted.is_err());
    /// ```
    pub fn new(
        id: impl Into<String>,
        interior: (f64, f64, f64),
        exterior: (f64, f64, f64),
        max_weight: f64,
        cost: f64,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        let container = Self {
            name: id.clone(),
            code: id.to_ascii_uppercase(),
            id,
            kind: ContainerKind::Box,
            interior,
            exterior,
            empty_weight: 0.0,
            max_weight,
            cost,
            priority: 0,
        };
        container.validate()?;
        Ok(container)
    }

    /// Checks the catalog invariants of this container.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let interior = self.interior_dims();
        let exterior = self.exterior_dims();
        validate_dims(interior, "Interior")?;
        validate_dims(exterior, "Exterior")?;
        if !interior.fits_within(&exterior, 0.0) {
            return Err(ValidationError::InvalidDimension(format!(
                "Exterior {} must not be smaller than interior {}",
                exterior.dimension_string(),
                interior.dimension_string()
            )));
        }
        if self.max_weight <= 0.0 || !self.max_weight.is_finite() {
            return Err(ValidationError::InvalidWeight(format!(
                "Max weight must be positive, got: {}",
                self.max_weight
            )));
        }
        validate_non_negative_weight(self.empty_weight, "Empty weight")?;
        if self.cost < 0.0 || !self.cost.is_finite() {
            return Err(ValidationError::InvalidCost(format!(
                "Cost must not be negative, got: {}",
                self.cost
            )));
        }
        Ok(())
    }

    /// Sets display metadata (Builder pattern light).
    pub fn with_meta(
        mut self,
        name: impl Into<String>,
        code: impl Into<String>,
        kind: ContainerKind,
    ) -> Self {
        self.name = name.into();
        self.code = code.into();
        self.kind = kind;
        self
    }

    /// Sets the empty container weight.
    pub fn with_empty_weight(mut self, empty_weight: f64) -> Self {
        self.empty_weight = empty_weight;
        self
    }

    /// Sets the listing priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Interior dimensions as Vec3.
    #[inline]
    pub fn interior_dims(&self) -> Vec3 {
        Vec3::from(self.interior)
    }

    /// Exterior dimensions as Vec3.
    #[inline]
    pub fn exterior_dims(&self) -> Vec3 {
        Vec3::from(self.exterior)
    }

    /// Usable interior volume in cm³.
    pub fn interior_volume(&self) -> f64 {
        self.interior_dims().volume()
    }
}

/// Container dimensions are the interior ones; fit checks work on the inside.
impl Dimensional for Container {
    fn dimensions(&self) -> Vec3 {
        self.interior_dims()
    }
}

impl Weighted for Container {
    fn weight(&self) -> f64 {
        self.empty_weight
    }
}
