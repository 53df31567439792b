//! Per-statement timing statistics, collected only in debug mode.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use common::{BoundedMap, Eviction, Timestamp};
use serde::Serialize;

/// Aggregated timings of one distinct SQL text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryStats {
    pub count: u64,
    pub total_ms: f64,
    pub average_ms: f64,
    pub last_executed: Timestamp,
}

/// Records how long each statement takes and flags slow ones.
#[derive(Debug)]
pub struct QueryAnalyzer {
    enabled: bool,
    threshold: Duration,
    stats: Mutex<BoundedMap<String, QueryStats>>,
}

impl QueryAnalyzer {
    /// Maximum number of distinct statements tracked.
    pub const MAX_TRACKED: usize = 100;

    pub fn new(enabled: bool, threshold: Duration) -> Self {
        Self {
            enabled,
            threshold,
            stats: Mutex::new(BoundedMap::new(
                Self::MAX_TRACKED,
                Eviction::LeastRecentlyUsed,
            )),
        }
    }

    /// An analyzer that never records anything.
    pub fn disabled() -> Self {
        Self::new(false, Duration::from_millis(100))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn record(&self, sql: &str, elapsed: Duration) {
        if !self.enabled {
            return;
        }

        let duration_ms = elapsed.as_secs_f64() * 1000.0;
        let average_ms = {
            let mut stats = self.lock();
            let entry = stats.touch_or_insert_with(sql.to_string(), || QueryStats {
                count: 0,
                total_ms: 0.0,
                average_ms: 0.0,
                last_executed: Timestamp::now(),
            });
            entry.count += 1;
            entry.total_ms += duration_ms;
            entry.average_ms = entry.total_ms / entry.count as f64;
            entry.last_executed = Timestamp::now();
            entry.average_ms
        };

        if elapsed.as_secs_f64() > self.threshold.as_secs_f64() * 1.5 {
            tracing::warn!(
                sql = %preview(sql),
                duration_ms,
                average_ms,
                threshold_ms = self.threshold.as_millis() as u64,
                "Slow query detected"
            );
        }
    }

    /// Statistics for every tracked statement.
    pub fn query_stats(&self) -> BTreeMap<String, QueryStats> {
        if !self.enabled {
            return BTreeMap::new();
        }
        self.lock()
            .iter()
            .map(|(sql, stats)| (sql.clone(), stats.clone()))
            .collect()
    }

    /// Statements whose average duration exceeds the threshold.
    pub fn slow_queries(&self) -> BTreeMap<String, QueryStats> {
        let threshold_ms = self.threshold.as_secs_f64() * 1000.0;
        self.query_stats()
            .into_iter()
            .filter(|(_, stats)| stats.average_ms > threshold_ms)
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, BoundedMap<String, QueryStats>> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn preview(sql: &str) -> String {
    let mut chars = sql.chars();
    let head: String = chars.by_ref().take(100).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
