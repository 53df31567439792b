//! Repositories over the SQLite store.
//!
//! Each repository owns a cheap clone of [`store::Database`], validates
//! payloads before writing and decodes rows into `domain` records. Mitra
//! scoped repositories take the mitra id on every call so a mitra can never
//! reach another mitra's rows.

pub mod catalog;
pub mod drivers;
pub mod error;
pub mod mitra_profiles;
pub mod orders;
pub mod reference;
mod rows;
pub mod service_instances;

pub use catalog::CatalogRepository;
pub use drivers::DriverRepository;
pub use error::{RepositoryError, Result};
pub use mitra_profiles::MitraProfileRepository;
pub use orders::OrderRepository;
pub use reference::{
    CargoTypeRepository, FacilityRepository, ReferenceRepository, TransportationModeRepository,
};
pub use service_instances::ServiceInstanceRepository;
