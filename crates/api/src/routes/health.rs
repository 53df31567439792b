//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::diagnostics::{Diagnostics, HealthState, HealthStatus};

/// GET /health: 200 when the store answers, 503 otherwise.
pub async fn check(
    State(diagnostics): State<Arc<Diagnostics>>,
) -> (StatusCode, Json<HealthStatus>) {
    let status = diagnostics.health.check().await;
    let code = match status.status {
        HealthState::Healthy => StatusCode::OK,
        HealthState::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(status))
}
