use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Counters shared between the acquisition loop and the display bridge.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

struct Metrics {
    rows_logged: u64,
    read_failures: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub rows_logged: u64,
    pub read_failures: u64,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics {
                rows_logged: 0,
                read_failures: 0,
            }),
        }
    }

    pub fn record_row(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.rows_logged += 1;
        }
    }

    pub fn record_read_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.read_failures += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            MetricsSnapshot {
                rows_logged: metrics.rows_logged,
                read_failures: metrics.read_failures,
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let recorder = MetricsRecorder::new();
        recorder.record_row();
        recorder.record_row();
        recorder.record_read_failure();

        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.rows_logged, 2);
        assert_eq!(snapshot.read_failures, 1);
    }
}
