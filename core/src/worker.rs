use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::runtime::Builder;
use tokio::sync::{mpsc, oneshot};

use crate::prelude::{RequestHandler, SensorError, SensorResult, WorkerConfig};
use crate::processing::BatchAggregator;
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use crate::wire::{BatchRequest, TaskEnvelope, TaskRequest, TaskResponse};

type Job = (TaskEnvelope, oneshot::Sender<TaskResponse>);

/// Background processor that owns the request handler on its own thread.
pub struct BatchWorker;

impl BatchWorker {
    /// Starts a worker backed by a [`BatchAggregator`].
    pub fn spawn(config: &WorkerConfig) -> SensorResult<WorkerHandle> {
        let metrics = Arc::new(MetricsRecorder::new());
        let handler = BatchAggregator::new(metrics.clone());
        Self::spawn_with_handler(config, handler, metrics)
    }

    pub fn spawn_with_handler<H: RequestHandler>(
        config: &WorkerConfig,
        handler: H,
        metrics: Arc<MetricsRecorder>,
    ) -> SensorResult<WorkerHandle> {
        let runtime = Builder::new_current_thread()
            .build()
            .map_err(|err| SensorError::Internal(format!("building worker runtime: {}", err)))?;
        let (sender, receiver) = mpsc::unbounded_channel();

        let thread = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || runtime.block_on(run_loop(receiver, handler)))
            .map_err(|err| SensorError::Internal(format!("spawning worker thread: {}", err)))?;

        Ok(WorkerHandle {
            sender,
            thread,
            metrics,
        })
    }
}

async fn run_loop<H: RequestHandler>(mut receiver: mpsc::UnboundedReceiver<Job>, mut handler: H) {
    let logger = LogManager::new("worker");
    logger.record("worker started");

    while let Some((envelope, reply)) = receiver.recv().await {
        let request = match TaskRequest::from_envelope(envelope) {
            Ok(request) => request,
            Err(err) => {
                logger.warn(&format!("dropping request: {}", err));
                continue;
            }
        };

        if let Some(response) = handler.handle(request) {
            if reply.send(response).is_err() {
                logger.trace_detail("requester dropped before the response was ready");
            }
        }
    }

    logger.record("worker stopped");
}

/// Caller side of the task boundary.
pub struct WorkerHandle {
    sender: mpsc::UnboundedSender<Job>,
    thread: JoinHandle<()>,
    metrics: Arc<MetricsRecorder>,
}

impl WorkerHandle {
    pub fn submit(&self, envelope: TaskEnvelope) -> SensorResult<PendingResponse> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send((envelope, reply))
            .map_err(|_| SensorError::WorkerUnavailable("worker has stopped".into()))?;
        Ok(PendingResponse { response })
    }

    pub fn submit_batch(&self, request: &BatchRequest) -> SensorResult<PendingResponse> {
        self.submit(TaskEnvelope::process_batch(request)?)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Closes the request channel and waits for queued work to drain.
    pub fn shutdown(self) -> SensorResult<()> {
        let WorkerHandle { sender, thread, .. } = self;
        drop(sender);
        thread
            .join()
            .map_err(|_| SensorError::Internal("worker thread panicked".into()))
    }
}

/// Reply slot for one submitted request. Resolves to `None` when the request
/// produced no response.
pub struct PendingResponse {
    response: oneshot::Receiver<TaskResponse>,
}

impl PendingResponse {
    pub async fn recv(self) -> Option<TaskResponse> {
        self.response.await.ok()
    }

    /// Must not be called from inside an async runtime.
    pub fn blocking_recv(self) -> Option<TaskResponse> {
        self.response.blocking_recv().ok()
    }
}
