use std::sync::Arc;

use crate::prelude::RequestHandler;
use crate::processing::parser::parse_raw;
use crate::telemetry::{LogManager, MetricsRecorder};
use crate::wire::{AggregatedBatch, BatchRequest, GnssFix, RawMessage, TaskRequest, TaskResponse};

/// Folds parsed readings into column buffers, one batch request at a time.
pub struct BatchAggregator {
    logger: LogManager,
    metrics: Arc<MetricsRecorder>,
}

impl BatchAggregator {
    pub fn new(metrics: Arc<MetricsRecorder>) -> Self {
        Self {
            logger: LogManager::new("aggregator"),
            metrics,
        }
    }

    /// Builds a fresh batch from `messages` in input order.
    ///
    /// `max_points` is passed through for consumers only; every valid
    /// reading is appended. Messages that cannot be decoded are logged and
    /// skipped without touching the buffers.
    pub fn process_batch(
        &self,
        messages: &[RawMessage],
        max_points: Option<f64>,
    ) -> AggregatedBatch {
        let mut batch = AggregatedBatch::default();
        let mut rejected = 0;

        for (index, message) in messages.iter().enumerate() {
            let parsed = match parse_raw(message) {
                Ok(parsed) => parsed,
                Err(err) => {
                    rejected += 1;
                    self.logger
                        .warn(&format!("discarding message {}: {}", index, err));
                    continue;
                }
            };

            if let Some(reading) = &parsed.imu0 {
                batch.imu0.push(reading);
            }
            if let Some(reading) = &parsed.imu1 {
                batch.imu1.push(reading);
            }
            if let Some(reading) = &parsed.gnss {
                batch.gnss.push(GnssFix::from(reading));
            }
        }

        self.metrics.record_batch(messages.len(), rejected);
        self.logger.record(&format!(
            "batch of {} messages -> imu0 {}, imu1 {}, gnss {}, rejected {}",
            messages.len(),
            batch.imu0.len(),
            batch.imu1.len(),
            batch.gnss.len(),
            rejected
        ));
        if let Some(limit) = max_points {
            self.logger
                .trace_detail(&format!("consumer point budget {}", limit));
        }

        batch
    }

    pub fn process_request(&self, request: &BatchRequest) -> AggregatedBatch {
        self.process_batch(&request.messages, request.max_points)
    }
}

impl Default for BatchAggregator {
    fn default() -> Self {
        Self::new(Arc::new(MetricsRecorder::new()))
    }
}

impl RequestHandler for BatchAggregator {
    fn handle(&mut self, request: TaskRequest) -> Option<TaskResponse> {
        match request {
            TaskRequest::ProcessBatch(batch) => {
                Some(TaskResponse::ProcessedData(self.process_request(&batch)))
            }
            TaskRequest::Unknown(kind) => {
                self.metrics.record_unknown();
                self.logger
                    .record(&format!("ignoring task of unknown type {:?}", kind));
                None
            }
        }
    }
}
