//! Cached liveness check of the process and the store.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use common::Timestamp;
use serde::Serialize;
use store::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub status: HealthState,
    /// Seconds since start.
    pub uptime: u64,
    pub database: bool,
    pub timestamp: Timestamp,
}

/// Pings the store at most once per [`CACHE_FOR`](Self::CACHE_FOR).
#[derive(Debug)]
pub struct HealthCheck {
    db: Database,
    started: Instant,
    last: Mutex<Option<(Instant, HealthStatus)>>,
}

impl HealthCheck {
    pub const CACHE_FOR: Duration = Duration::from_secs(5);

    pub fn new(db: Database) -> Self {
        Self {
            db,
            started: Instant::now(),
            last: Mutex::new(None),
        }
    }

    pub async fn check(&self) -> HealthStatus {
        if let Some((at, status)) = self.cached() {
            if at.elapsed() < Self::CACHE_FOR {
                return status;
            }
        }

        let database = match self.db.ping().await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(error = %err, "Database health check failed");
                false
            }
        };
        let status = HealthStatus {
            status: if database {
                HealthState::Healthy
            } else {
                HealthState::Unhealthy
            },
            uptime: self.started.elapsed().as_secs(),
            database,
            timestamp: Timestamp::now(),
        };

        *self.last.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((Instant::now(), status.clone()));
        status
    }

    fn cached(&self) -> Option<(Instant, HealthStatus)> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
