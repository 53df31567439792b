//! Mitra self-service endpoints under `/mitra`.
//!
//! Every handler acts for the mitra resolved by [`MitraContext`].

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::{DriverId, OrderId, ServiceInstanceId};
use domain::{
    Deleted, Driver, DriverPayload, MitraOrderSummary, MitraProfile, MitraProfilePayload, Order,
    ServiceInstance, ServiceInstancePayload, ServiceTemplate, StatusUpdate,
};
use repositories::{
    DriverRepository, MitraProfileRepository, OrderRepository, ServiceInstanceRepository,
};
use serde::Deserialize;

use crate::auth::MitraContext;
use crate::error::ApiError;
use crate::extract::{ApiPath, ApiQuery, ValidatedJson};

/// GET /mitra/profile
#[tracing::instrument(skip(profiles))]
pub async fn profile(
    State(profiles): State<MitraProfileRepository>,
    MitraContext(mitra): MitraContext,
) -> Result<Json<MitraProfile>, ApiError> {
    Ok(Json(profiles.get(mitra).await?))
}

/// PUT /mitra/profile
#[tracing::instrument(skip(profiles, payload))]
pub async fn update_profile(
    State(profiles): State<MitraProfileRepository>,
    MitraContext(mitra): MitraContext,
    ValidatedJson(payload): ValidatedJson<MitraProfilePayload>,
) -> Result<Json<MitraProfile>, ApiError> {
    Ok(Json(profiles.update(mitra, &payload).await?))
}

/// GET /mitra/service-templates
#[tracing::instrument(skip(instances))]
pub async fn templates(
    State(instances): State<ServiceInstanceRepository>,
    MitraContext(_mitra): MitraContext,
) -> Result<Json<Vec<ServiceTemplate>>, ApiError> {
    Ok(Json(instances.templates().await?))
}

/// GET /mitra/service-instances
#[tracing::instrument(skip(instances))]
pub async fn list_instances(
    State(instances): State<ServiceInstanceRepository>,
    MitraContext(mitra): MitraContext,
) -> Result<Json<Vec<ServiceInstance>>, ApiError> {
    Ok(Json(instances.list_for_mitra(mitra).await?))
}

/// GET /mitra/service-instances/{id}
#[tracing::instrument(skip(instances))]
pub async fn instance(
    State(instances): State<ServiceInstanceRepository>,
    MitraContext(mitra): MitraContext,
    ApiPath(id): ApiPath<ServiceInstanceId>,
) -> Result<Json<ServiceInstance>, ApiError> {
    Ok(Json(instances.get(mitra, id).await?))
}

/// POST /mitra/service-instances
#[tracing::instrument(skip(instances, payload))]
pub async fn create_instance(
    State(instances): State<ServiceInstanceRepository>,
    MitraContext(mitra): MitraContext,
    ValidatedJson(payload): ValidatedJson<ServiceInstancePayload>,
) -> Result<(StatusCode, Json<ServiceInstance>), ApiError> {
    let created = instances.create(mitra, &payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /mitra/service-instances/{id}
#[tracing::instrument(skip(instances, payload))]
pub async fn update_instance(
    State(instances): State<ServiceInstanceRepository>,
    MitraContext(mitra): MitraContext,
    ApiPath(id): ApiPath<ServiceInstanceId>,
    ValidatedJson(payload): ValidatedJson<ServiceInstancePayload>,
) -> Result<Json<ServiceInstance>, ApiError> {
    Ok(Json(instances.update(mitra, id, &payload).await?))
}

/// DELETE /mitra/service-instances/{id}
#[tracing::instrument(skip(instances))]
pub async fn delete_instance(
    State(instances): State<ServiceInstanceRepository>,
    MitraContext(mitra): MitraContext,
    ApiPath(id): ApiPath<ServiceInstanceId>,
) -> Result<Json<Deleted>, ApiError> {
    Ok(Json(instances.delete(mitra, id).await?))
}

/// GET /mitra/service-instances/{id}/drivers
#[tracing::instrument(skip(drivers))]
pub async fn list_drivers(
    State(drivers): State<DriverRepository>,
    MitraContext(mitra): MitraContext,
    ApiPath(instance_id): ApiPath<ServiceInstanceId>,
) -> Result<Json<Vec<Driver>>, ApiError> {
    Ok(Json(drivers.list_for_instance(mitra, instance_id).await?))
}

/// POST /mitra/service-instances/{id}/drivers
#[tracing::instrument(skip(drivers, payload))]
pub async fn create_driver(
    State(drivers): State<DriverRepository>,
    MitraContext(mitra): MitraContext,
    ApiPath(instance_id): ApiPath<ServiceInstanceId>,
    ValidatedJson(payload): ValidatedJson<DriverPayload>,
) -> Result<(StatusCode, Json<Driver>), ApiError> {
    let created = drivers.create(mitra, instance_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /mitra/drivers/{id}
#[tracing::instrument(skip(drivers))]
pub async fn driver(
    State(drivers): State<DriverRepository>,
    MitraContext(mitra): MitraContext,
    ApiPath(id): ApiPath<DriverId>,
) -> Result<Json<Driver>, ApiError> {
    Ok(Json(drivers.get(mitra, id).await?))
}

/// PUT /mitra/drivers/{id}
#[tracing::instrument(skip(drivers, payload))]
pub async fn update_driver(
    State(drivers): State<DriverRepository>,
    MitraContext(mitra): MitraContext,
    ApiPath(id): ApiPath<DriverId>,
    ValidatedJson(payload): ValidatedJson<DriverPayload>,
) -> Result<Json<Driver>, ApiError> {
    Ok(Json(drivers.update(mitra, id, &payload).await?))
}

/// DELETE /mitra/drivers/{id}
#[tracing::instrument(skip(drivers))]
pub async fn delete_driver(
    State(drivers): State<DriverRepository>,
    MitraContext(mitra): MitraContext,
    ApiPath(id): ApiPath<DriverId>,
) -> Result<Json<Deleted>, ApiError> {
    Ok(Json(drivers.delete(mitra, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    #[serde(default)]
    pub service_instance_id: Option<ServiceInstanceId>,
}

/// GET /mitra/orders
#[tracing::instrument(skip(orders))]
pub async fn list_orders(
    State(orders): State<OrderRepository>,
    MitraContext(mitra): MitraContext,
    ApiQuery(query): ApiQuery<OrdersQuery>,
) -> Result<Json<Vec<MitraOrderSummary>>, ApiError> {
    Ok(Json(
        orders
            .list_for_mitra(mitra, query.service_instance_id)
            .await?,
    ))
}

/// PUT /mitra/orders/{id}/status
#[tracing::instrument(skip(orders, update))]
pub async fn update_order_status(
    State(orders): State<OrderRepository>,
    MitraContext(mitra): MitraContext,
    ApiPath(id): ApiPath<OrderId>,
    ValidatedJson(update): ValidatedJson<StatusUpdate>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(orders.update_status(mitra, id, &update).await?))
}
