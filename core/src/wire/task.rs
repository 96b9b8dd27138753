use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::prelude::{SensorError, SensorResult};
use crate::wire::batch::AggregatedBatch;

/// One entry of a batch as it arrived; anything that is not text is kept so
/// the parser can reject that single message instead of the whole request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawMessage {
    Text(String),
    Other(Value),
}

impl From<&str> for RawMessage {
    fn from(line: &str) -> Self {
        RawMessage::Text(line.to_string())
    }
}

impl From<String> for RawMessage {
    fn from(line: String) -> Self {
        RawMessage::Text(line)
    }
}

/// Untyped inbound message: `{ "type": ..., "data": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

impl TaskEnvelope {
    pub const PROCESS_BATCH: &'static str = "processBatch";

    pub fn process_batch(request: &BatchRequest) -> SensorResult<Self> {
        let data = serde_json::to_value(request)
            .map_err(|err| SensorError::Internal(format!("encoding batch request: {}", err)))?;
        Ok(Self {
            kind: Self::PROCESS_BATCH.to_string(),
            data,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub messages: Vec<RawMessage>,
    /// Rendering budget for consumers; the aggregator never truncates.
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_points: Option<f64>,
}

/// Any JSON number is accepted as-is; anything else reads as absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|value| value.as_f64()))
}

impl BatchRequest {
    pub fn new<I, M>(messages: I, max_points: Option<f64>) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<RawMessage>,
    {
        Self {
            messages: messages.into_iter().map(Into::into).collect(),
            max_points,
        }
    }
}

/// Inbound request after dispatch on the envelope's `type`.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskRequest {
    ProcessBatch(BatchRequest),
    Unknown(String),
}

impl TaskRequest {
    pub fn from_envelope(envelope: TaskEnvelope) -> SensorResult<Self> {
        match envelope.kind.as_str() {
            TaskEnvelope::PROCESS_BATCH => serde_json::from_value(envelope.data)
                .map(TaskRequest::ProcessBatch)
                .map_err(|err| SensorError::InvalidRequest(err.to_string())),
            _ => Ok(TaskRequest::Unknown(envelope.kind)),
        }
    }
}

/// Outbound message: `{ "type": "processedData", "data": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum TaskResponse {
    ProcessedData(AggregatedBatch),
}
