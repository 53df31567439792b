//! Counts of distinct errors returned to clients.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use common::{BoundedMap, Eviction, Timestamp};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorStats {
    pub count: u64,
    pub last_occurrence: Timestamp,
}

/// Tracks how often each distinct error occurs.
///
/// Holds at most [`MAX_ERRORS`](Self::MAX_ERRORS) keys; when full, only the
/// [`RETAIN_ON_CLEANUP`](Self::RETAIN_ON_CLEANUP) most frequent survive.
/// Errors are logged when their count reaches 1, 10, 100 and so on.
#[derive(Debug)]
pub struct ErrorTracker {
    enabled: bool,
    counts: Mutex<BoundedMap<String, ErrorStats>>,
}

impl ErrorTracker {
    pub const MAX_ERRORS: usize = 1000;
    pub const RETAIN_ON_CLEANUP: usize = 800;

    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            counts: Mutex::new(BoundedMap::new(
                Self::MAX_ERRORS,
                Eviction::LeastFrequent {
                    retain: Self::RETAIN_ON_CLEANUP,
                },
            )),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Records one occurrence of `message` of kind `code` seen in `context`.
    pub fn track(&self, code: &str, message: &str, context: &str) {
        if !self.enabled {
            return;
        }

        let key = format!("{code}:{message}:{context}");
        let count = {
            let mut counts = self.lock();
            let stats = counts.touch_or_insert_with(key, || ErrorStats {
                count: 0,
                last_occurrence: Timestamp::now(),
            });
            stats.count += 1;
            stats.last_occurrence = Timestamp::now();
            stats.count
        };

        if is_significant(count) {
            tracing::error!(code, message, context, count, "Error threshold reached");
        }
    }

    pub fn stats(&self) -> BTreeMap<String, ErrorStats> {
        self.lock()
            .iter()
            .map(|(key, stats)| (key.clone(), stats.clone()))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, BoundedMap<String, ErrorStats>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// True for 1, 10, 100, ...
fn is_significant(mut count: u64) -> bool {
    if count == 0 {
        return false;
    }
    while count % 10 == 0 {
        count /= 10;
    }
    count == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn significant_counts_are_powers_of_ten() {
        let significant: Vec<u64> = (0..=1000).filter(|n| is_significant(*n)).collect();
        assert_eq!(significant, vec![1, 10, 100, 1000]);
    }

    #[test]
    fn disabled_tracker_records_nothing() {
        let tracker = ErrorTracker::new(false);
        tracker.track("NOT_FOUND", "Order not found", "GET /api/customer/orders/1");
        assert!(tracker.stats().is_empty());
    }

    #[test]
    fn counts_per_distinct_error() {
        let tracker = ErrorTracker::new(true);
        for _ in 0..3 {
            tracker.track("NOT_FOUND", "Order not found", "GET /orders");
        }
        tracker.track("VALIDATION_ERROR", "Name is required", "POST /facilities");

        let stats = tracker.stats();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats["NOT_FOUND:Order not found:GET /orders"].count, 3);
    }

    #[test]
    fn cleanup_keeps_most_frequent() {
        let tracker = ErrorTracker::new(true);
        tracker.track("INTERNAL_ERROR", "frequent", "ctx");
        tracker.track("INTERNAL_ERROR", "frequent", "ctx");
        for n in 0..ErrorTracker::MAX_ERRORS {
            tracker.track("NOT_FOUND", &format!("rare {n}"), "ctx");
        }

        let stats = tracker.stats();
        assert!(stats.len() <= ErrorTracker::MAX_ERRORS);
        assert!(stats.contains_key("INTERNAL_ERROR:frequent:ctx"));
    }
}
