//! Administrator-managed reference data.
//!
//! The three reference entities share one CRUD contract,
//! [`ReferenceRepository`], so the HTTP layer can serve them generically.

mod cargo_types;
mod facilities;
mod transportation_modes;

pub use cargo_types::CargoTypeRepository;
pub use facilities::FacilityRepository;
pub use transportation_modes::TransportationModeRepository;

use std::fmt::Display;

use async_trait::async_trait;
use domain::Deleted;
use serde::Serialize;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::Result;

/// CRUD over one reference table.
#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    /// Stored record returned to clients.
    type Record: Serialize + Send;
    /// Validated body of create and update requests.
    type Payload: DeserializeOwned + Validate + Send + Sync;
    /// Primary key type.
    type Id: Copy + Display + DeserializeOwned + Send + Sync;

    /// Human-readable entity name used in error messages.
    const ENTITY: &'static str;

    async fn get_all(&self) -> Result<Vec<Self::Record>>;

    /// Fails with `NotFound` if absent.
    async fn get_by_id(&self, id: Self::Id) -> Result<Self::Record>;

    /// Validates, inserts and returns the created record.
    async fn create(&self, payload: &Self::Payload) -> Result<Self::Record>;

    /// Validates and fully replaces the record. Fails with `NotFound` if absent.
    async fn update(&self, id: Self::Id, payload: &Self::Payload) -> Result<Self::Record>;

    /// Fails with `NotFound` if absent.
    async fn delete(&self, id: Self::Id) -> Result<Deleted>;
}
