//! Domain layer for the logistics marketplace.
//!
//! This crate provides:
//! - typed records for every stored entity
//! - validated request payloads (via `validator`)
//! - the order status state machine
//! - order pricing

pub mod catalog;
pub mod error;
pub mod mitra;
pub mod order;
pub mod pricing;
pub mod reference;
pub mod validation;

pub use catalog::{ServiceFilter, ServiceListing};
pub use error::DomainError;
pub use mitra::{
    Driver, DriverPayload, MitraProfile, MitraProfilePayload, ServiceConfig, ServiceInstance,
    ServiceInstancePayload, ServiceTemplate, VehicleInfo,
};
pub use order::{
    MitraOrderSummary, Order, OrderDetails, OrderParties, OrderReceipt, OrderStatus, PlaceOrder,
    StatusHistoryEntry, StatusUpdate,
};
pub use pricing::PricingFactors;
pub use reference::{
    CargoType, CargoTypePayload, Deleted, Facility, FacilityPayload, Outcome, TransportationMode,
    TransportationModePayload,
};
pub use validation::validate;
