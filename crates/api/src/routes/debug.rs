//! Debug snapshot endpoint, routed only in debug mode.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use crate::diagnostics::{DebugSnapshot, Diagnostics};

/// GET /debug
pub async fn snapshot(State(diagnostics): State<Arc<Diagnostics>>) -> Json<DebugSnapshot> {
    Json(diagnostics.snapshot())
}
