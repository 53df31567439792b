//! Reference data maintained by administrators.

use common::{CargoTypeId, FacilityId, ModeId, Timestamp};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::non_blank;

/// A way of moving cargo, with its capacity and tariff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportationMode {
    pub mode_id: ModeId,
    pub mode_name: String,
    pub description: Option<String>,
    pub capacity_kg: f64,
    pub base_price: f64,
    pub price_per_km: f64,
    pub created_at: Timestamp,
}

/// Body of `POST`/`PUT /api/transportation-modes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TransportationModePayload {
    #[validate(custom(function = "non_blank", message = "Mode name is required"))]
    pub mode_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Capacity must be positive"))]
    pub capacity_kg: f64,
    #[validate(range(exclusive_min = 0.0, message = "Base price must be positive"))]
    pub base_price: f64,
    #[validate(range(exclusive_min = 0.0, message = "Price per km must be positive"))]
    pub price_per_km: f64,
}

/// A category of goods and how it affects price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoType {
    pub cargo_type_id: CargoTypeId,
    pub type_name: String,
    pub description: Option<String>,
    pub handling_instructions: Option<String>,
    pub price_multiplier: f64,
    pub created_at: Timestamp,
}

fn default_price_multiplier() -> f64 {
    1.0
}

/// Body of `POST`/`PUT /api/cargo-types`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CargoTypePayload {
    #[validate(custom(function = "non_blank", message = "Type name is required"))]
    pub type_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub handling_instructions: Option<String>,
    #[serde(default = "default_price_multiplier")]
    #[validate(range(exclusive_min = 0.0, message = "Price multiplier must be positive"))]
    pub price_multiplier: f64,
}

/// An amenity that can be attached to transportation modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub facility_id: FacilityId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

/// Body of `POST`/`PUT /api/facilities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FacilityPayload {
    #[validate(custom(function = "non_blank", message = "Facility name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// `{"success": bool}` body of mutations that return no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
}

/// Response of deletions.
pub type Deleted = Outcome;

impl From<bool> for Outcome {
    fn from(success: bool) -> Self {
        Self { success }
    }
}
