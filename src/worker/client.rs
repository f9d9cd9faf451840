//! Async client running pivot computations on tokio's blocking pool.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, Semaphore};

use super::error::{WorkerError, WorkerResult};
use super::protocol::{PivotRequest, PivotResponse, RequestSequence};
use super::{Executor, ResponseSender};
use crate::config::WorkerSettings;
use crate::model::Dataset;
use crate::pivot::{AggregationResult, PivotSpec};

/// Default timeout for requests (30 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of computations allowed to run at once.
const DEFAULT_MAX_CONCURRENT: usize = 2;

/// Executor backed by the tokio runtime it was created in.
///
/// Every dispatched request becomes a task that waits for a permit, runs the
/// aggregation with `spawn_blocking` and sends the tagged response back.
/// Superseded requests are not cancelled; their responses still arrive and
/// the receiver drops them.
///
/// # Example
///
/// ```ignore
/// use carrier_pivot::worker::WorkerClient;
///
/// let client = WorkerClient::new()?;
/// let result = client.request(&dataset, &spec).await?;
/// ```
#[derive(Debug, Clone)]
pub struct WorkerClient {
    /// Runtime the computation tasks are spawned on.
    runtime: Handle,

    /// Bounds how many aggregations run at the same time.
    permits: Arc<Semaphore>,

    /// Ids for one-shot requests made through [`WorkerClient::request`].
    sequence: Arc<RequestSequence>,

    /// Request timeout duration.
    timeout: Duration,
}

impl WorkerClient {
    /// Create a client on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::NoRuntime`] when called outside a runtime.
    pub fn new() -> WorkerResult<Self> {
        Self::build(DEFAULT_MAX_CONCURRENT, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client using the `[worker]` settings.
    pub fn with_settings(settings: &WorkerSettings) -> WorkerResult<Self> {
        Self::build(settings.max_concurrent, settings.timeout())
    }

    fn build(max_concurrent: usize, timeout: Duration) -> WorkerResult<Self> {
        let runtime = Handle::try_current().map_err(WorkerError::NoRuntime)?;
        Ok(Self {
            runtime,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            sequence: Arc::new(RequestSequence::new()),
            timeout,
        })
    }

    /// Compute one aggregation and wait for it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pivot spec names fields the dataset does not have
    /// - The computation panics
    /// - No result arrives within the timeout
    pub async fn request(
        &self,
        dataset: &Dataset,
        spec: &PivotSpec,
    ) -> WorkerResult<AggregationResult> {
        let id = self.sequence.next();
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.dispatch(
            PivotRequest::new(id, dataset.clone(), spec.clone()),
            ResponseSender::new(id, tx),
        );

        match tokio::time::timeout(self.timeout, rx.recv()).await {
            Ok(Some(response)) => response.outcome,
            Ok(None) => Err(WorkerError::ChannelClosed),
            Err(_) => Err(WorkerError::Timeout(self.timeout.as_secs())),
        }
    }

    /// Get the current request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Set the request timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Computations that could start right now without waiting.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}

impl Executor for WorkerClient {
    fn dispatch(&self, request: PivotRequest, reply: ResponseSender) {
        let permits = Arc::clone(&self.permits);
        self.runtime.spawn(async move {
            let id = request.id;
            let response = match permits.acquire_owned().await {
                Ok(_permit) => {
                    tracing::debug!(request = %id, rows = request.dataset.len(), "computing pivot");
                    match tokio::task::spawn_blocking(move || request.execute()).await {
                        Ok(Ok(result)) => PivotResponse::completed(id, result),
                        Ok(Err(err)) => PivotResponse::failed(id, err),
                        Err(join) => PivotResponse::failed(id, join),
                    }
                }
                Err(_) => PivotResponse::failed(id, WorkerError::ChannelClosed),
            };
            if reply.send(response).is_err() {
                tracing::debug!(request = %id, "response receiver dropped");
            }
        });
    }
}
