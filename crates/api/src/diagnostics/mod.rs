//! In-process diagnostics: error counts, request timings, memory and health.
//!
//! Everything here is held in application state; nothing is global.

pub mod errors;
pub mod health;
pub mod memory;
pub mod timings;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use serde::Serialize;
use store::{Database, QueryStats};

pub use errors::{ErrorStats, ErrorTracker};
pub use health::{HealthCheck, HealthState, HealthStatus};
pub use memory::{MemoryMonitor, MemoryStats};
pub use timings::PerformanceMonitor;

use crate::error::ErrorReport;

/// The diagnostic components of one running server.
#[derive(Debug)]
pub struct Diagnostics {
    pub debug: bool,
    pub errors: ErrorTracker,
    pub timings: PerformanceMonitor,
    pub memory: Arc<MemoryMonitor>,
    pub health: HealthCheck,
    db: Database,
}

/// Body of `GET /debug`.
#[derive(Debug, Serialize)]
pub struct DebugSnapshot {
    pub memory: MemoryStats,
    pub query_stats: BTreeMap<String, QueryStats>,
    pub slow_queries: BTreeMap<String, QueryStats>,
    pub timings: BTreeMap<String, f64>,
    pub errors: BTreeMap<String, ErrorStats>,
}

impl Diagnostics {
    /// `track_errors` is false in development, where errors are only logged.
    pub fn new(db: Database, debug: bool, track_errors: bool) -> Self {
        Self {
            debug,
            errors: ErrorTracker::new(track_errors),
            timings: PerformanceMonitor::new(debug),
            memory: Arc::new(MemoryMonitor::default()),
            health: HealthCheck::new(db.clone()),
            db,
        }
    }

    pub fn snapshot(&self) -> DebugSnapshot {
        let analyzer = self.db.analyzer();
        DebugSnapshot {
            memory: self.memory.stats(),
            query_stats: analyzer.query_stats(),
            slow_queries: analyzer.slow_queries(),
            timings: self.timings.timings(),
            errors: self.errors.stats(),
        }
    }
}

/// Times every request and records error responses.
pub async fn observe_requests(
    State(diagnostics): State<Arc<Diagnostics>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let context = format!("{} {}", req.method(), path);

    let start = Instant::now();
    let response = next.run(req).await;
    diagnostics.timings.record(&context, start.elapsed());

    if let Some(report) = response.extensions().get::<ErrorReport>() {
        let code = report.code.as_str();
        metrics::counter!("http_errors_total", "code" => code).increment(1);
        diagnostics.errors.track(code, &report.message, &context);
    }

    response
}
