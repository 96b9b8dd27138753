use serde::{Deserialize, Serialize};

use crate::wire::{TaskRequest, TaskResponse};

/// Configuration for the background batch worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub thread_name: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            thread_name: "sensorcore-worker".to_string(),
        }
    }
}

/// Common error type for the telemetry pipeline.
#[derive(thiserror::Error, Debug)]
pub enum SensorError {
    #[error("unexpected parse failure: {0}")]
    UnexpectedParse(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("worker unavailable: {0}")]
    WorkerUnavailable(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type SensorResult<T> = Result<T, SensorError>;

/// Handler invoked by the worker for every decoded inbound request.
///
/// Returning `None` means the request produced no response.
pub trait RequestHandler: Send + 'static {
    fn handle(&mut self, request: TaskRequest) -> Option<TaskResponse>;
}
