//! Customer orders and their status lifecycle.

use std::fmt;
use std::str::FromStr;

use common::{CustomerId, DriverId, OrderId, ServiceInstanceId, Timestamp};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::DomainError;
use crate::validation::non_blank;

/// Lifecycle of an order.
///
/// ```text
/// pending ──► accepted ──► picked_up ──► in_transit ──► delivered
///    │            │
///    └────────────┴──► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    PickedUp,
    InTransit,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Returns true if an order in this status may move to `next`.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted)
                | (Pending, Cancelled)
                | (Accepted, PickedUp)
                | (Accepted, Cancelled)
                | (PickedUp, InTransit)
                | (InTransit, Delivered)
        )
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Checks a transition, returning the new status.
    pub fn transition(self, next: OrderStatus) -> Result<OrderStatus, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::InTransit => "in_transit",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "accepted" => Ok(OrderStatus::Accepted),
            "picked_up" => Ok(OrderStatus::PickedUp),
            "in_transit" => Ok(OrderStatus::InTransit),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// A stored order row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub service_instance_id: ServiceInstanceId,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub pickup_address: String,
    pub delivery_address: String,
    /// Cargo type name at the time of ordering.
    pub cargo_type: String,
    pub cargo_weight: f64,
    pub total_price: f64,
    pub notes: Option<String>,
    pub driver_id: Option<DriverId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Body of `POST /api/customer/orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PlaceOrder {
    pub service_id: ServiceInstanceId,
    #[validate(custom(function = "non_blank", message = "Pickup address is required"))]
    pub pickup_address: String,
    #[validate(custom(function = "non_blank", message = "Delivery address is required"))]
    pub delivery_address: String,
    #[validate(custom(function = "non_blank", message = "Cargo type is required"))]
    pub cargo_type: String,
    #[validate(range(exclusive_min = 0.0, message = "Cargo weight must be positive"))]
    pub cargo_weight: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Response of a successful order placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub total_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

/// Names joined onto an order for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderParties {
    pub mitra_name: String,
    pub mode_name: String,
    pub driver_name: Option<String>,
}

/// An order as its customer sees it, newest history entry first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    #[serde(flatten)]
    pub parties: OrderParties,
    pub status_history: Vec<StatusHistoryEntry>,
}

/// One row of `GET /mitra/orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitraOrderSummary {
    pub id: OrderId,
    pub status: OrderStatus,
    pub pickup_address: String,
    pub delivery_address: String,
    pub cargo_type: String,
    pub cargo_weight: f64,
    pub total_price: f64,
    pub service_instance_id: ServiceInstanceId,
    pub service_config: String,
    pub driver_id: Option<DriverId>,
    pub driver_name: Option<String>,
    pub created_at: Timestamp,
}

/// Body of `PUT /mitra/orders/{id}/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StatusUpdate {
    pub status: OrderStatus,
    #[serde(default)]
    pub driver_id: Option<DriverId>,
    #[serde(default)]
    pub notes: Option<String>,
}
