use sensorcore::AggregatedBatch;
use serde::{Deserialize, Serialize};

/// State served to polling clients.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BridgeModel {
    pub processed_batches: usize,
    pub latest: Option<AggregatedBatch>,
}

impl BridgeModel {
    pub fn record(&mut self, batch: AggregatedBatch) {
        self.processed_batches += 1;
        self.latest = Some(batch);
    }
}
