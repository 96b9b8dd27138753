use std::sync::Mutex;

/// Counters shared between the worker thread and whoever holds its handle.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub batches: usize,
    pub messages: usize,
    pub rejected: usize,
    pub unknown_requests: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_batch(&self, messages: usize, rejected: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.batches += 1;
            metrics.messages += messages;
            metrics.rejected += rejected;
        }
    }

    pub fn record_unknown(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.unknown_requests += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
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
    fn counters_accumulate() {
        let metrics = MetricsRecorder::new();
        metrics.record_batch(10, 2);
        metrics.record_batch(5, 0);
        metrics.record_unknown();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.batches, 2);
        assert_eq!(snapshot.messages, 15);
        assert_eq!(snapshot.rejected, 2);
        assert_eq!(snapshot.unknown_requests, 1);
    }
}
