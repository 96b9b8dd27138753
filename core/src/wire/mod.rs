pub mod batch;
pub mod reading;
pub mod task;

pub use batch::{AggregatedBatch, AxisColumns, GnssFix, ImuColumns};
pub use reading::{
    GnssReading, ImuId, ImuReading, ParsedMessage, SensorTag, Timestamp, Vector3,
};
pub use task::{BatchRequest, RawMessage, TaskEnvelope, TaskRequest, TaskResponse};
