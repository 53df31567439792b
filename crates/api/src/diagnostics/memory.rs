//! Process memory sampling for debug mode.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Memory figures in whole megabytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    pub rss_mb: u64,
    pub virtual_mb: u64,
}

impl MemoryStats {
    /// Reads the current process figures. Zero where the platform offers none.
    pub fn sample() -> Self {
        read_statm().unwrap_or_default()
    }
}

#[cfg(target_os = "linux")]
fn read_statm() -> Option<MemoryStats> {
    // statm reports pages: total program size, then resident set.
    const PAGE_SIZE: u64 = 4096;
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let mut fields = statm.split_whitespace().map(|f| f.parse::<u64>().ok());
    let size = fields.next()??;
    let resident = fields.next()??;
    Some(MemoryStats {
        rss_mb: resident * PAGE_SIZE / BYTES_PER_MB,
        virtual_mb: size * PAGE_SIZE / BYTES_PER_MB,
    })
}

#[cfg(not(target_os = "linux"))]
fn read_statm() -> Option<MemoryStats> {
    None
}

/// Logs memory usage whenever it moved by more than the threshold since the
/// last logged sample.
#[derive(Debug)]
pub struct MemoryMonitor {
    threshold_mb: u64,
    last: Mutex<Option<MemoryStats>>,
}

impl Default for MemoryMonitor {
    fn default() -> Self {
        Self::new(Self::SIGNIFICANT_CHANGE_MB)
    }
}

impl MemoryMonitor {
    pub const SIGNIFICANT_CHANGE_MB: u64 = 10;

    pub fn new(threshold_mb: u64) -> Self {
        Self {
            threshold_mb,
            last: Mutex::new(None),
        }
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats::sample()
    }

    /// Compares `current` with the last kept sample. Returns true, and keeps
    /// `current`, if the change is significant.
    pub fn observe(&self, current: MemoryStats) -> bool {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let significant = match *last {
            None => true,
            Some(previous) => {
                previous.rss_mb.abs_diff(current.rss_mb) > self.threshold_mb
                    || previous.virtual_mb.abs_diff(current.virtual_mb) > self.threshold_mb
            }
        };
        if significant {
            if let Some(previous) = *last {
                tracing::debug!(
                    rss_mb = current.rss_mb,
                    virtual_mb = current.virtual_mb,
                    rss_diff_mb = current.rss_mb as i64 - previous.rss_mb as i64,
                    "Significant memory change detected"
                );
            }
            *last = Some(current);
        }
        significant
    }

    /// Samples memory on a fixed interval until the task is aborted.
    pub fn spawn(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tracing::debug!(interval_secs = every.as_secs(), "Memory monitoring started");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                self.observe(MemoryStats::sample());
            }
        })
    }
}
