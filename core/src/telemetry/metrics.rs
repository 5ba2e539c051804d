use std::sync::Mutex;

/// Counters describing how sessions ended.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub stale_discarded: usize,
    pub wake_probes: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_submitted(&self) {
        self.update(|m| m.submitted += 1);
    }

    pub fn record_succeeded(&self) {
        self.update(|m| m.succeeded += 1);
    }

    pub fn record_failed(&self) {
        self.update(|m| m.failed += 1);
    }

    pub fn record_stale(&self) {
        self.update(|m| m.stale_discarded += 1);
    }

    pub fn record_wake_probe(&self) {
        self.update(|m| m.wake_probes += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }

    fn update(&self, apply: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
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
    fn snapshot_reflects_recorded_counts() {
        let metrics = MetricsRecorder::new();
        metrics.record_submitted();
        metrics.record_submitted();
        metrics.record_failed();
        metrics.record_stale();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.submitted, 2);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.stale_discarded, 1);
        assert_eq!(snapshot.succeeded, 0);
    }
}
