//! CRUD endpoints shared by the three reference entities.
//!
//! Each handler is generic over a [`ReferenceRepository`] taken from state,
//! so `/api/transportation-modes`, `/api/cargo-types` and `/api/facilities`
//! are the same code.

use axum::Json;
use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use domain::Deleted;
use repositories::ReferenceRepository;

use crate::error::ApiError;
use crate::extract::{ApiPath, ValidatedJson};
use crate::state::AppState;

/// Routes for one entity, mounted at `prefix`.
pub fn routes<R>(prefix: &str) -> Router<AppState>
where
    R: ReferenceRepository + FromRef<AppState> + Clone + 'static,
{
    Router::new()
        .route(prefix, get(list::<R>).post(create::<R>))
        .route(
            &format!("{prefix}/{{id}}"),
            get(fetch::<R>).put(update::<R>).delete(remove::<R>),
        )
}

/// GET `prefix`
#[tracing::instrument(skip_all, fields(entity = R::ENTITY))]
pub async fn list<R: ReferenceRepository>(
    State(repo): State<R>,
) -> Result<Json<Vec<R::Record>>, ApiError> {
    Ok(Json(repo.get_all().await?))
}

/// GET `prefix/{id}`
#[tracing::instrument(skip_all, fields(entity = R::ENTITY, id = %id))]
pub async fn fetch<R: ReferenceRepository>(
    State(repo): State<R>,
    ApiPath(id): ApiPath<R::Id>,
) -> Result<Json<R::Record>, ApiError> {
    Ok(Json(repo.get_by_id(id).await?))
}

/// POST `prefix`
#[tracing::instrument(skip_all, fields(entity = R::ENTITY))]
pub async fn create<R: ReferenceRepository>(
    State(repo): State<R>,
    ValidatedJson(payload): ValidatedJson<R::Payload>,
) -> Result<(StatusCode, Json<R::Record>), ApiError> {
    let record = repo.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT `prefix/{id}`
#[tracing::instrument(skip_all, fields(entity = R::ENTITY, id = %id))]
pub async fn update<R: ReferenceRepository>(
    State(repo): State<R>,
    ApiPath(id): ApiPath<R::Id>,
    ValidatedJson(payload): ValidatedJson<R::Payload>,
) -> Result<Json<R::Record>, ApiError> {
    Ok(Json(repo.update(id, &payload).await?))
}

/// DELETE `prefix/{id}`
#[tracing::instrument(skip_all, fields(entity = R::ENTITY, id = %id))]
pub async fn remove<R: ReferenceRepository>(
    State(repo): State<R>,
    ApiPath(id): ApiPath<R::Id>,
) -> Result<Json<Deleted>, ApiError> {
    Ok(Json(repo.delete(id).await?))
}
