//! Public catalog and customer order endpoints under `/api/customer`.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::{OrderId, ServiceInstanceId};
use domain::{CargoType, Order, OrderDetails, OrderReceipt, PlaceOrder, ServiceFilter, ServiceListing};
use ordering::OrderPlacement;
use repositories::{CatalogRepository, OrderRepository};

use crate::auth::CustomerContext;
use crate::diagnostics::Diagnostics;
use crate::error::ApiError;
use crate::extract::{ApiPath, ApiQuery, ValidatedJson};

/// GET /api/customer/services
#[tracing::instrument(skip(catalog))]
pub async fn services(
    State(catalog): State<CatalogRepository>,
    ApiQuery(filter): ApiQuery<ServiceFilter>,
) -> Result<Json<Vec<ServiceListing>>, ApiError> {
    Ok(Json(catalog.services(&filter).await?))
}

/// GET /api/customer/services/{id}
#[tracing::instrument(skip(catalog))]
pub async fn service(
    State(catalog): State<CatalogRepository>,
    ApiPath(id): ApiPath<ServiceInstanceId>,
) -> Result<Json<ServiceListing>, ApiError> {
    Ok(Json(catalog.service(id).await?))
}

/// GET /api/customer/cargo-types
#[tracing::instrument(skip(catalog))]
pub async fn cargo_types(
    State(catalog): State<CatalogRepository>,
) -> Result<Json<Vec<CargoType>>, ApiError> {
    Ok(Json(catalog.cargo_types().await?))
}

/// Timing name of the placement transaction in `/debug`.
pub const PLACEMENT_TIMING: &str = "transaction order-placement";

/// POST /api/customer/orders
#[tracing::instrument(skip(placement, diagnostics, order))]
pub async fn place_order(
    State(placement): State<OrderPlacement>,
    State(diagnostics): State<Arc<Diagnostics>>,
    CustomerContext(customer): CustomerContext,
    ValidatedJson(order): ValidatedJson<PlaceOrder>,
) -> Result<(StatusCode, Json<OrderReceipt>), ApiError> {
    let receipt = diagnostics
        .timings
        .measure(PLACEMENT_TIMING, placement.place(&customer, &order))
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// GET /api/customer/orders
#[tracing::instrument(skip(orders))]
pub async fn orders(
    State(orders): State<OrderRepository>,
    CustomerContext(customer): CustomerContext,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(orders.list_for_customer(&customer).await?))
}

/// GET /api/customer/orders/{id}
#[tracing::instrument(skip(orders))]
pub async fn order(
    State(orders): State<OrderRepository>,
    CustomerContext(customer): CustomerContext,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<OrderDetails>, ApiError> {
    Ok(Json(orders.get_for_customer(&customer, id).await?))
}
