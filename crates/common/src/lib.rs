//! Shared types used across the marketplace crates.

pub mod bounded;
pub mod timestamp;
pub mod types;

pub use bounded::{BoundedMap, Eviction};
pub use timestamp::Timestamp;
pub use types::{
    CargoTypeId, CustomerId, DriverId, FacilityId, MitraId, ModeId, OrderId, ServiceInstanceId,
    TemplateId,
};
