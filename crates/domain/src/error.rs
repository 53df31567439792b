//! Domain error types.

use thiserror::Error;

use crate::order::OrderStatus;

/// Errors raised by domain rules.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A payload failed validation. The message is safe to show to clients.
    #[error("{0}")]
    Validation(String),

    /// An order cannot move from its current status to the requested one.
    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// A status string that is not one of the known order statuses.
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
