//! Parse-and-aggregate pipeline for semicolon-delimited IMU/GNSS telemetry.
//!
//! Raw lines are decoded by the [`processing::parser`], folded into column
//! buffers by the [`processing::aggregator`], and served across an
//! asynchronous request/response boundary by the [`worker`].

pub mod prelude;
pub mod processing;
pub mod telemetry;
pub mod wire;
pub mod worker;

pub use prelude::{RequestHandler, SensorError, SensorResult, WorkerConfig};
pub use wire::{AggregatedBatch, TaskEnvelope, TaskRequest, TaskResponse};
pub use worker::{BatchWorker, PendingResponse, WorkerHandle};
