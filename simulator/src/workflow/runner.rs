use anyhow::{ensure, Context};
use sensorcore::wire::{AggregatedBatch, AxisColumns, BatchRequest, TaskResponse};
use sensorcore::WorkerHandle;

use crate::generator::profile::build_messages;
use crate::workflow::config::WorkflowConfig;

pub struct WorkflowResult {
    pub batches: usize,
    pub messages: usize,
    pub imu0_samples: usize,
    pub imu1_samples: usize,
    pub gnss_fixes: usize,
    /// Newest `max_points` entries of the combined result.
    pub latest: AggregatedBatch,
    pub smoothed_imu0_angular_velocity: AxisColumns,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Generates a workload, pushes it through the worker batch by batch and
    /// applies the point budget on the caller side.
    pub fn execute(&self, worker: &WorkerHandle) -> anyhow::Result<WorkflowResult> {
        ensure!(self.config.batch_size > 0, "batch_size must be positive");

        let lines = build_messages(&self.config.to_generator_config())
            .context("generating telemetry lines")?;

        let pending = lines
            .chunks(self.config.batch_size)
            .map(|chunk| {
                let request = BatchRequest::new(
                    chunk.iter().cloned(),
                    Some(self.config.max_points as f64),
                );
                worker.submit_batch(&request)
            })
            .collect::<Result<Vec<_>, _>>()
            .context("submitting batches")?;
        let batches = pending.len();

        let mut combined = AggregatedBatch::default();
        for (index, reply) in pending.into_iter().enumerate() {
            let TaskResponse::ProcessedData(batch) = reply
                .blocking_recv()
                .with_context(|| format!("batch {} produced no response", index))?;
            combined.extend(batch);
        }

        let latest = combined.latest(self.config.max_points);
        let smoothed_imu0_angular_velocity = latest
            .imu0
            .angular_velocity
            .smoothed(self.config.smoothing_window);

        Ok(WorkflowResult {
            batches,
            messages: lines.len(),
            imu0_samples: combined.imu0.len(),
            imu1_samples: combined.imu1.len(),
            gnss_fixes: combined.gnss.len(),
            latest,
            smoothed_imu0_angular_velocity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorcore::{BatchWorker, WorkerConfig};

    #[test]
    fn runner_executes_workflow() {
        let worker = BatchWorker::spawn(&WorkerConfig::default()).unwrap();
        let cfg = WorkflowConfig {
            messages: 250,
            batch_size: 100,
            max_points: 40,
            malformed_ratio: 0.0,
            ..Default::default()
        };

        let result = Runner::new(cfg).execute(&worker).unwrap();
        assert_eq!(result.batches, 3);
        assert_eq!(result.messages, 250);
        assert_eq!(result.imu0_samples, 250);
        assert_eq!(result.imu1_samples, 250);
        assert_eq!(result.gnss_fixes, 250);
        assert_eq!(result.latest.imu0.len(), 40);
        assert_eq!(result.latest.gnss.len(), 40);
        assert_eq!(result.smoothed_imu0_angular_velocity.len(), 40);
        assert_eq!(worker.metrics().batches, 3);
        worker.shutdown().unwrap();
    }

    #[test]
    fn malformed_lines_shrink_the_result() {
        let worker = BatchWorker::spawn(&WorkerConfig::default()).unwrap();
        let cfg = WorkflowConfig {
            messages: 50,
            batch_size: 10,
            malformed_ratio: 1.0,
            ..Default::default()
        };

        let result = Runner::new(cfg).execute(&worker).unwrap();
        assert_eq!(result.messages, 50);
        assert!(result.latest.is_empty());
        worker.shutdown().unwrap();
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let worker = BatchWorker::spawn(&WorkerConfig::default()).unwrap();
        let cfg = WorkflowConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(Runner::new(cfg).execute(&worker).is_err());
        worker.shutdown().unwrap();
    }
}
