//! Facility to transportation mode association endpoints.

use axum::Json;
use axum::extract::State;
use common::{FacilityId, ModeId};
use domain::{Facility, Outcome};
use repositories::FacilityRepository;

use crate::error::ApiError;
use crate::extract::ApiPath;

/// GET /api/facilities/mode/{mode_id}
#[tracing::instrument(skip(facilities))]
pub async fn by_mode(
    State(facilities): State<FacilityRepository>,
    ApiPath(mode_id): ApiPath<ModeId>,
) -> Result<Json<Vec<Facility>>, ApiError> {
    Ok(Json(facilities.get_by_mode_id(mode_id).await?))
}

/// POST /api/facilities/mode/{mode_id}/facility/{facility_id}
#[tracing::instrument(skip(facilities))]
pub async fn attach(
    State(facilities): State<FacilityRepository>,
    ApiPath((mode_id, facility_id)): ApiPath<(ModeId, FacilityId)>,
) -> Result<Json<Outcome>, ApiError> {
    Ok(Json(facilities.add_to_mode(mode_id, facility_id).await?))
}

/// DELETE /api/facilities/mode/{mode_id}/facility/{facility_id}
#[tracing::instrument(skip(facilities))]
pub async fn detach(
    State(facilities): State<FacilityRepository>,
    ApiPath((mode_id, facility_id)): ApiPath<(ModeId, FacilityId)>,
) -> Result<Json<Outcome>, ApiError> {
    Ok(Json(facilities.remove_from_mode(mode_id, facility_id).await?))
}
