//! Integration tests for the API server.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use api::Identities;
use api::auth::{Credentials, StaticCredentials};
use api::diagnostics::Diagnostics;
use api::state::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::MitraId;
use metrics_exporter_prometheus::PrometheusHandle;
use ordering::FixedDistanceEstimator;
use serde_json::{Value, json};
use store::{Database, Params};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

const STATIC_DIR: &str = "../../public";

#[derive(Default)]
struct Options {
    debug: bool,
    mitra_binding: Option<MitraId>,
}

async fn seeded_db() -> Database {
    let db = Database::connect_in_memory().await.unwrap();
    for sql in [
        "INSERT INTO transportation_modes (mode_name, description, capacity_kg, base_price, price_per_km)
         VALUES ('Motor Roda Dua', 'Sepeda motor untuk pengiriman cepat', 20, 10000, 2000)",
        "INSERT INTO cargo_types (type_name, price_multiplier) VALUES ('Umum', 1.0)",
        "INSERT INTO cargo_types (type_name, price_multiplier) VALUES ('Mudah Pecah', 1.5)",
        "INSERT INTO facilities (name) VALUES ('Tracking')",
        "INSERT INTO mode_facilities (mode_id, facility_id) VALUES (1, 1)",
        "INSERT INTO mitra_profiles (name, contact_info) VALUES ('PT Logistik Nusantara', '{}')",
        "INSERT INTO mitra_profiles (name) VALUES ('CV Kirim Cepat')",
        "INSERT INTO service_templates (name, mode_id) VALUES ('Kurir Motor', 1)",
        "INSERT INTO service_instances (mitra_id, template_id, config)
         VALUES (1, 1, '{\"service_area\":[\"Jakarta\"],\"operating_hours\":\"24h\",\"vehicle_types\":[]}')",
    ] {
        db.execute(sql, &Params::new()).await.unwrap();
    }
    db
}

async fn setup_with(options: Options) -> axum::Router {
    let db = seeded_db().await;
    let diagnostics = Arc::new(Diagnostics::new(db.clone(), options.debug, true));
    let state = AppState::new(
        db,
        Arc::new(FixedDistanceEstimator::default()),
        diagnostics,
    );
    let identities = Identities {
        admin: Arc::new(StaticCredentials::new(Credentials::new("admin", "secret"))),
        mitra: Arc::new(
            StaticCredentials::new(Credentials::new("mitra_admin", "password"))
                .bound_to(options.mitra_binding),
        ),
    };
    api::create_app(state, identities, get_metrics_handle(), Path::new(STATIC_DIR))
}

async fn setup() -> axum::Router {
    setup_with(Options::default()).await
}

fn basic(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

fn admin(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    request(method, uri, body, &[("authorization", &basic("admin", "secret"))])
}

fn mitra(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    request(
        method,
        uri,
        body,
        &[
            ("authorization", &basic("mitra_admin", "password")),
            ("x-mitra-id", "1"),
        ],
    )
}

fn customer(method: &str, uri: &str, body: Option<Value>, id: &str) -> Request<Body> {
    request(method, uri, body, &[("x-customer-id", id)])
}

fn request(method: &str, uri: &str, body: Option<Value>, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

#[tokio::test]
async fn test_health_check() {
    let app = setup().await;

    let (status, json) = send(&app, request("GET", "/health", None, &[])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], true);
    assert!(json["uptime"].as_u64().is_some());
    assert!(json["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_admin_routes_require_credentials() {
    let app = setup().await;

    let (status, json) = send(&app, request("GET", "/api/cargo-types", None, &[])).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json, json!({ "error": "Unauthorized" }));

    let wrong = request(
        "DELETE",
        "/api/transportation-modes/1",
        None,
        &[("authorization", &basic("admin", "guess"))],
    );
    let (status, json) = send(&app, wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Unauthorized");

    let (status, _) = send(&app, admin("GET", "/api/transportation-modes/1", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_mode_create_rename_scenario() {
    let app = setup().await;

    let (status, created) = send(
        &app,
        admin(
            "POST",
            "/api/transportation-modes",
            Some(json!({
                "mode_name": "Pickup",
                "capacity_kg": 1000,
                "base_price": 50000,
                "price_per_km": 5000
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["mode_id"].as_i64().unwrap();

    let (_, all) = send(&app, admin("GET", "/api/transportation-modes", None)).await;
    assert!(all.as_array().unwrap().iter().any(|m| m["mode_id"] == id));

    let (status, updated) = send(
        &app,
        admin(
            "PUT",
            &format!("/api/transportation-modes/{id}"),
            Some(json!({
                "mode_name": "Pickup XL",
                "capacity_kg": 1000,
                "base_price": 50000,
                "price_per_km": 5000
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["mode_name"], "Pickup XL");

    let (_, all) = send(&app, admin("GET", "/api/transportation-modes", None)).await;
    let matching: Vec<_> = all
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["mode_id"] == id)
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0]["mode_name"], "Pickup XL");
    assert!(!all.as_array().unwrap().iter().any(|m| m["mode_name"] == "Pickup"));
}

#[tokio::test]
async fn test_invalid_input_is_bad_request() {
    let app = setup().await;

    let (status, json) = send(
        &app,
        admin(
            "POST",
            "/api/transportation-modes",
            Some(json!({
                "mode_name": "Pickup",
                "capacity_kg": "heavy",
                "base_price": 1,
                "price_per_km": 1
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().is_some());

    let (status, json) = send(
        &app,
        admin("POST", "/api/facilities", Some(json!({ "name": "" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Facility name is required");

    let (status, _) = send(&app, admin("GET", "/api/cargo-types/abc", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_entities_are_not_found() {
    let app = setup().await;

    let (status, json) = send(&app, admin("GET", "/api/transportation-modes/99", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Transportation mode not found");

    let (status, _) = send(&app, admin("DELETE", "/api/facilities/99", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        admin("POST", "/api/facilities/mode/1/facility/99", None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_facility_mode_association() {
    let app = setup().await;

    let (_, attached) = send(&app, admin("GET", "/api/facilities/mode/1", None)).await;
    assert_eq!(attached.as_array().unwrap().len(), 1);

    let (status, json) = send(
        &app,
        admin("DELETE", "/api/facilities/mode/1/facility/1", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "success": true }));

    let (_, json) = send(
        &app,
        admin("DELETE", "/api/facilities/mode/1/facility/1", None),
    )
    .await;
    assert_eq!(json, json!({ "success": false }));

    let (_, json) = send(&app, admin("POST", "/api/facilities/mode/1/facility/1", None)).await;
    assert_eq!(json, json!({ "success": true }));
}

#[tokio::test]
async fn test_mitra_scoping() {
    let app = setup().await;

    let without_header = request(
        "GET",
        "/mitra/profile",
        None,
        &[("authorization", &basic("mitra_admin", "password"))],
    );
    let (status, _) = send(&app, without_header).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, profile) = send(&app, mitra("GET", "/mitra/profile", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], "PT Logistik Nusantara");

    let (_, instances) = send(&app, mitra("GET", "/mitra/service-instances", None)).await;
    assert_eq!(instances.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        mitra(
            "PUT",
            "/mitra/profile",
            Some(json!({ "name": "PT Baru", "contact_info": "not json" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bound_mitra_account() {
    let app = setup_with(Options {
        mitra_binding: Some(MitraId::new(2)),
        ..Options::default()
    })
    .await;

    let implicit = request(
        "GET",
        "/mitra/profile",
        None,
        &[("authorization", &basic("mitra_admin", "password"))],
    );
    let (status, profile) = send(&app, implicit).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], "CV Kirim Cepat");

    let (status, _) = send(&app, mitra("GET", "/mitra/profile", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_order_flow() {
    let app = setup().await;

    let (status, services) = send(&app, request("GET", "/api/customer/services", None, &[])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(services[0]["facilities"], json!(["Tracking"]));

    let (status, _) = send(
        &app,
        request("GET", "/api/customer/services?mode_id=x", None, &[]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let order = json!({
        "service_id": 1,
        "pickup_address": "Jl. Sudirman 1",
        "delivery_address": "Jl. Thamrin 2",
        "cargo_type": "Mudah Pecah",
        "cargo_weight": 5
    });
    let (status, _) = send(
        &app,
        request("POST", "/api/customer/orders", Some(order.clone()), &[]),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, receipt) = send(
        &app,
        customer("POST", "/api/customer/orders", Some(order), "customer-1"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["status"], "pending");
    assert_eq!(receipt["total_price"], 45000.0);
    let order_id = receipt["order_id"].as_i64().unwrap();

    let uri = format!("/api/customer/orders/{order_id}");
    let (status, details) = send(&app, customer("GET", &uri, None, "customer-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["mitra_name"], "PT Logistik Nusantara");
    assert_eq!(details["mode_name"], "Motor Roda Dua");
    assert_eq!(details["status_history"][0]["notes"], "Order placed");

    let (status, _) = send(&app, customer("GET", &uri, None, "customer-2")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = send(
        &app,
        mitra(
            "PUT",
            &format!("/mitra/orders/{order_id}/status"),
            Some(json!({ "status": "accepted" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "accepted");

    let (status, json) = send(
        &app,
        mitra(
            "PUT",
            &format!("/mitra/orders/{order_id}/status"),
            Some(json!({ "status": "delivered" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["error"],
        "Cannot change order status from accepted to delivered"
    );

    let (_, mine) = send(&app, mitra("GET", "/mitra/orders", None)).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_cargo_type_is_rejected() {
    let app = setup().await;

    let (status, json) = send(
        &app,
        customer(
            "POST",
            "/api/customer/orders",
            Some(json!({
                "service_id": 1,
                "pickup_address": "A",
                "delivery_address": "B",
                "cargo_type": "Cair",
                "cargo_weight": 1
            })),
            "customer-1",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid service or cargo type");
}

#[tokio::test]
async fn test_debug_endpoint_only_in_debug_mode() {
    let app = setup().await;
    let response = app
        .clone()
        .oneshot(request("GET", "/debug", None, &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = setup_with(Options {
        debug: true,
        ..Options::default()
    })
    .await;
    send(&app, request("GET", "/health", None, &[])).await;
    let (status, json) = send(&app, request("GET", "/debug", None, &[])).await;
    assert_eq!(status, StatusCode::OK);
    for key in ["memory", "query_stats", "slow_queries", "timings", "errors"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert!(json["timings"].get("GET /health").is_some());
}

#[tokio::test]
async fn test_order_placement_is_timed_in_debug_mode() {
    let app = setup_with(Options {
        debug: true,
        ..Options::default()
    })
    .await;

    let (status, _) = send(
        &app,
        customer(
            "POST",
            "/api/customer/orders",
            Some(json!({
                "service_id": 1,
                "pickup_address": "Jl. Sudirman 1",
                "delivery_address": "Jl. Thamrin 2",
                "cargo_type": "Umum",
                "cargo_weight": 2
            })),
            "customer-1",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, json) = send(&app, request("GET", "/debug", None, &[])).await;
    assert!(
        json["timings"]
            .get(api::routes::customer::PLACEMENT_TIMING)
            .is_some()
    );
}

#[tokio::test]
async fn test_lowercase_basic_scheme_is_accepted() {
    let app = setup().await;
    let token = STANDARD.encode("admin:secret");

    let (status, _) = send(
        &app,
        request(
            "GET",
            "/api/cargo-types",
            None,
            &[("authorization", &format!("basic {token}"))],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_error_responses_are_tracked() {
    let app = setup_with(Options {
        debug: true,
        ..Options::default()
    })
    .await;

    send(&app, request("GET", "/api/cargo-types", None, &[])).await;
    let (_, json) = send(&app, request("GET", "/debug", None, &[])).await;

    let errors = json["errors"].as_object().unwrap();
    assert!(
        errors
            .keys()
            .any(|key| key.starts_with("AUTHORIZATION_ERROR:Unauthorized"))
    );
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup().await;
    send(&app, request("GET", "/api/cargo-types", None, &[])).await;

    let response = app
        .oneshot(request("GET", "/metrics", None, &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_static_front_end_is_served() {
    let app = setup().await;

    let response = app
        .oneshot(request("GET", "/index.html", None, &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
