//! HTTP server of the logistics marketplace.
//!
//! Serves the admin reference-data API, the mitra self-service API, the
//! public customer API, diagnostics and the static front ends, with
//! structured logging (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::http::Request;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use repositories::{CargoTypeRepository, FacilityRepository, TransportationModeRepository};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use auth::IdentityProvider;
use state::AppState;

/// Who may call the protected route groups.
#[derive(Clone)]
pub struct Identities {
    pub admin: Arc<dyn IdentityProvider>,
    pub mitra: Arc<dyn IdentityProvider>,
}

/// Creates the Axum application router with all routes and shared state.
///
/// Paths not matched by any route are served from `static_dir`.
pub fn create_app(
    state: AppState,
    identities: Identities,
    metrics_handle: PrometheusHandle,
    static_dir: &Path,
) -> Router {
    let diagnostics = state.diagnostics.clone();

    let admin = Router::new()
        .merge(routes::reference::routes::<TransportationModeRepository>(
            "/api/transportation-modes",
        ))
        .merge(routes::reference::routes::<CargoTypeRepository>(
            "/api/cargo-types",
        ))
        .merge(routes::reference::routes::<FacilityRepository>(
            "/api/facilities",
        ))
        .route(
            "/api/facilities/mode/{mode_id}",
            get(routes::facilities::by_mode),
        )
        .route(
            "/api/facilities/mode/{mode_id}/facility/{facility_id}",
            post(routes::facilities::attach).delete(routes::facilities::detach),
        )
        .route_layer(from_fn_with_state(identities.admin, auth::require_basic_auth));

    let mitra = Router::new()
        .route(
            "/mitra/profile",
            get(routes::mitra::profile).put(routes::mitra::update_profile),
        )
        .route("/mitra/service-templates", get(routes::mitra::templates))
        .route(
            "/mitra/service-instances",
            get(routes::mitra::list_instances).post(routes::mitra::create_instance),
        )
        .route(
            "/mitra/service-instances/{id}",
            get(routes::mitra::instance)
                .put(routes::mitra::update_instance)
                .delete(routes::mitra::delete_instance),
        )
        .route(
            "/mitra/service-instances/{id}/drivers",
            get(routes::mitra::list_drivers).post(routes::mitra::create_driver),
        )
        .route(
            "/mitra/drivers/{id}",
            get(routes::mitra::driver)
                .put(routes::mitra::update_driver)
                .delete(routes::mitra::delete_driver),
        )
        .route("/mitra/orders", get(routes::mitra::list_orders))
        .route(
            "/mitra/orders/{id}/status",
            put(routes::mitra::update_order_status),
        )
        .route_layer(from_fn_with_state(identities.mitra, auth::require_basic_auth));

    let customer = Router::new()
        .route("/api/customer/services", get(routes::customer::services))
        .route("/api/customer/services/{id}", get(routes::customer::service))
        .route("/api/customer/cargo-types", get(routes::customer::cargo_types))
        .route(
            "/api/customer/orders",
            get(routes::customer::orders).post(routes::customer::place_order),
        )
        .route("/api/customer/orders/{id}", get(routes::customer::order));

    let mut app = Router::new()
        .route("/health", get(routes::health::check))
        .merge(admin)
        .merge(mitra)
        .merge(customer);
    if diagnostics.debug {
        app = app.route("/debug", get(routes::debug::snapshot));
    }

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    app.with_state(state)
        .merge(metrics_router)
        .fallback_service(ServeDir::new(static_dir))
        .layer(from_fn_with_state(diagnostics, diagnostics::observe_requests))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
                tracing::info_span!(
                    "request",
                    id = %uuid::Uuid::new_v4(),
                    method = %req.method(),
                    path = %req.uri().path(),
                )
            }),
        )
}
