//! Shared application state.

use std::sync::Arc;

use axum::extract::FromRef;
use ordering::{DistanceEstimator, OrderPlacement};
use repositories::{
    CargoTypeRepository, CatalogRepository, DriverRepository, FacilityRepository,
    MitraProfileRepository, OrderRepository, ServiceInstanceRepository,
    TransportationModeRepository,
};
use store::Database;

use crate::diagnostics::Diagnostics;

/// Everything a handler may need. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub modes: TransportationModeRepository,
    pub cargo_types: CargoTypeRepository,
    pub facilities: FacilityRepository,
    pub profiles: MitraProfileRepository,
    pub instances: ServiceInstanceRepository,
    pub drivers: DriverRepository,
    pub orders: OrderRepository,
    pub catalog: CatalogRepository,
    pub placement: OrderPlacement,
    pub diagnostics: Arc<Diagnostics>,
}

impl AppState {
    pub fn new(
        db: Database,
        distance: Arc<dyn DistanceEstimator>,
        diagnostics: Arc<Diagnostics>,
    ) -> Self {
        Self {
            modes: TransportationModeRepository::new(db.clone()),
            cargo_types: CargoTypeRepository::new(db.clone()),
            facilities: FacilityRepository::new(db.clone()),
            profiles: MitraProfileRepository::new(db.clone()),
            instances: ServiceInstanceRepository::new(db.clone()),
            drivers: DriverRepository::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            catalog: CatalogRepository::new(db.clone()),
            placement: OrderPlacement::new(db.clone(), distance),
            diagnostics,
            db,
        }
    }
}

macro_rules! state_part {
    ($($field:ident: $ty:ty),+ $(,)?) => {
        $(
            impl FromRef<AppState> for $ty {
                fn from_ref(state: &AppState) -> Self {
                    state.$field.clone()
                }
            }
        )+
    };
}

state_part!(
    modes: TransportationModeRepository,
    cargo_types: CargoTypeRepository,
    facilities: FacilityRepository,
    profiles: MitraProfileRepository,
    instances: ServiceInstanceRepository,
    drivers: DriverRepository,
    orders: OrderRepository,
    catalog: CatalogRepository,
    placement: OrderPlacement,
    diagnostics: Arc<Diagnostics>,
);
