//! API server entry point.

use std::sync::Arc;

use api::Identities;
use api::auth::StaticCredentials;
use api::config::Config;
use api::diagnostics::Diagnostics;
use api::state::AppState;
use ordering::FixedDistanceEstimator;
use store::{Database, DatabaseOptions};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    let registry = tracing_subscriber::registry().with(filter);

    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // 2. Initialize tracing
    init_tracing(&config);

    // 3. Install Prometheus metrics recorder
    let metrics_handle =
        metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    // 4. Open the store and apply migrations
    let options = DatabaseOptions {
        path: config.database_path.clone(),
        debug: config.debug,
        slow_query_threshold: config.slow_query_threshold,
    };
    let db = Database::connect(&options).await?;
    db.run_migrations().await?;

    // 5. Build application state
    let diagnostics = Arc::new(Diagnostics::new(
        db.clone(),
        config.debug,
        config.environment != api::config::Environment::Development,
    ));
    let _memory_task = config
        .debug
        .then(|| diagnostics.memory.clone().spawn(config.memory_monitor_interval));

    let identities = Identities {
        admin: Arc::new(StaticCredentials::new(config.admin.clone())),
        mitra: Arc::new(StaticCredentials::new(config.mitra.clone()).bound_to(config.mitra_id)),
    };
    let state = AppState::new(
        db,
        Arc::new(FixedDistanceEstimator::default()),
        diagnostics,
    );

    // 6. Build the application
    let app = api::create_app(state, identities, metrics_handle, &config.static_dir);

    // 7. Start server
    let addr = config.addr();
    tracing::info!(%addr, environment = %config.environment, debug = config.debug, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down gracefully");
    Ok(())
}
