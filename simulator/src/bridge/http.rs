use log::{info, warn};
use sensorcore::{TaskEnvelope, TaskResponse, WorkerHandle};
use serde_json::json;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use warp::{http::StatusCode, Filter, Reply};

use crate::bridge::model::BridgeModel;

const MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

pub fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

/// Exposes the worker's task boundary as JSON over HTTP.
pub struct HttpBridge {
    worker: Arc<WorkerHandle>,
    state: Arc<RwLock<BridgeModel>>,
}

impl HttpBridge {
    pub fn new(worker: Arc<WorkerHandle>) -> Self {
        Self {
            worker,
            state: Arc::new(RwLock::new(BridgeModel::default())),
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
        let state = self.state.clone();
        let state_filter = warp::any().map(move || state.clone());
        let worker = self.worker.clone();
        let worker_filter = warp::any().map(move || worker.clone());

        let latest_route = warp::path("latest")
            .and(warp::path::end())
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<BridgeModel>>| match state.read() {
                Ok(model) => warp::reply::json(&*model).into_response(),
                Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            });

        let task_route = warp::path("task")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::content_length_limit(MAX_BODY_BYTES))
            .and(warp::body::json())
            .and(worker_filter)
            .and(state_filter)
            .and_then(handle_task);

        latest_route.or(task_route)
    }

    pub async fn serve<F>(self, address: SocketAddr, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (bound, server) =
            warp::serve(self.routes()).try_bind_with_graceful_shutdown(address, shutdown)?;
        info!("HTTP bridge listening on {}", bound);
        server.await;
        info!("HTTP bridge stopped");
        Ok(())
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> BridgeModel {
        self.state.read().unwrap().clone()
    }
}

async fn handle_task(
    envelope: TaskEnvelope,
    worker: Arc<WorkerHandle>,
    state: Arc<RwLock<BridgeModel>>,
) -> Result<warp::reply::Response, warp::Rejection> {
    let pending = match worker.submit(envelope) {
        Ok(pending) => pending,
        Err(err) => {
            warn!("task submission failed: {}", err);
            return Ok(warp::reply::with_status(
                warp::reply::json(&json!({ "error": err.to_string() })),
                StatusCode::SERVICE_UNAVAILABLE,
            )
            .into_response());
        }
    };

    match pending.recv().await {
        Some(response) => {
            let TaskResponse::ProcessedData(batch) = &response;
            if let Ok(mut model) = state.write() {
                model.record(batch.clone());
            }
            Ok(warp::reply::json(&response).into_response())
        }
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorcore::{BatchWorker, WorkerConfig};
    use serde_json::Value;

    fn bridge() -> HttpBridge {
        let worker = BatchWorker::spawn(&WorkerConfig::default()).unwrap();
        HttpBridge::new(Arc::new(worker))
    }

    #[tokio::test]
    async fn task_route_returns_processed_data() {
        let bridge = bridge();
        let response = warp::test::request()
            .method("POST")
            .path("/task")
            .json(&json!({
                "type": "processBatch",
                "data": {
                    "messages": ["imu0,1,2,0,0,0,0,0,0,0,0,0;gnss,10.5,20.5,30.5", "garbage"],
                    "maxPoints": 10
                }
            }))
            .reply(&bridge.routes())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["type"], "processedData");
        assert_eq!(body["data"]["imu0"]["angularVelocity"]["x"], json!([0.0]));
        assert_eq!(body["data"]["gnss"][0]["latitude"], json!(10.5));
        assert_eq!(bridge.snapshot().processed_batches, 1);
    }

    #[tokio::test]
    async fn unknown_task_type_has_no_content() {
        let bridge = bridge();
        let response = warp::test::request()
            .method("POST")
            .path("/task")
            .json(&json!({ "type": "calibrate", "data": {} }))
            .reply(&bridge.routes())
            .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(bridge.snapshot().processed_batches, 0);
    }

    #[tokio::test]
    async fn latest_route_reports_state() {
        let bridge = bridge();
        let response = warp::test::request()
            .method("GET")
            .path("/latest")
            .reply(&bridge.routes())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["processedBatches"], json!(0));
        assert!(body["latest"].is_null());
    }
}
