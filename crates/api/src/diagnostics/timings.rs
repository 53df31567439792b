//! Durations of recent named operations, recorded in debug mode.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use common::{BoundedMap, Eviction};

#[derive(Debug)]
pub struct PerformanceMonitor {
    enabled: bool,
    marks: Mutex<BoundedMap<String, f64>>,
}

impl PerformanceMonitor {
    pub const MAX_MARKS: usize = 50;

    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            marks: Mutex::new(BoundedMap::new(
                Self::MAX_MARKS,
                Eviction::LeastRecentlyUsed,
            )),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Stores the latest duration of `name`.
    pub fn record(&self, name: &str, elapsed: Duration) {
        if !self.enabled {
            return;
        }
        let mut marks = self.lock();
        *marks.touch_or_insert_with(name.to_string(), || 0.0) = elapsed.as_secs_f64() * 1000.0;
    }

    /// Runs `operation`, recording how long it took.
    pub async fn measure<F: Future>(&self, name: &str, operation: F) -> F::Output {
        if !self.enabled {
            return operation.await;
        }
        let start = Instant::now();
        let output = operation.await;
        self.record(name, start.elapsed());
        output
    }

    /// Latest duration in milliseconds per operation name.
    pub fn timings(&self) -> BTreeMap<String, f64> {
        self.lock()
            .iter()
            .map(|(name, ms)| (name.clone(), *ms))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, BoundedMap<String, f64>> {
        self.marks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn measure_records_when_enabled() {
        let monitor = PerformanceMonitor::new(true);
        let value = monitor.measure("GET /health", async { 7 }).await;
        assert_eq!(value, 7);
        assert!(monitor.timings().contains_key("GET /health"));
    }

    #[tokio::test]
    async fn disabled_monitor_stays_empty() {
        let monitor = PerformanceMonitor::new(false);
        monitor.measure("GET /health", async {}).await;
        monitor.record("GET /metrics", Duration::from_millis(3));
        assert!(monitor.timings().is_empty());
    }

    #[test]
    fn bounded_to_max_marks() {
        let monitor = PerformanceMonitor::new(true);
        for n in 0..(PerformanceMonitor::MAX_MARKS + 10) {
            monitor.record(&format!("op {n}"), Duration::from_millis(1));
        }
        let timings = monitor.timings();
        assert_eq!(timings.len(), PerformanceMonitor::MAX_MARKS);
        assert!(!timings.contains_key("op 0"));
        assert!(timings.contains_key("op 59"));
    }
}
