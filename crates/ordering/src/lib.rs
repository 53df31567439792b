//! Order placement for customers.
//!
//! Placing an order prices it from the service's transportation mode and the
//! cargo type, then writes the order and its first status-history row in a
//! single transaction. Distance is supplied by a [`DistanceEstimator`].

pub mod distance;
pub mod error;
pub mod placement;

pub use distance::{DistanceEstimator, FixedDistanceEstimator};
pub use error::{OrderingError, Result};
pub use placement::OrderPlacement;
