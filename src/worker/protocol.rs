//! Request and response messages exchanged with the pivot worker.
//!
//! Both sides own their data: a request carries a shared snapshot of the rows
//! and its own copy of the spec, so the worker holds no state between
//! requests.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

use super::error::{WorkerError, WorkerResult};
use crate::model::Dataset;
use crate::pivot::{aggregate, AggregationResult, PivotResult, PivotSpec};

/// Correlates a response with the request that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic source of request ids, starting at 1.
#[derive(Debug, Default)]
pub struct RequestSequence {
    last: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> RequestId {
        RequestId(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// One aggregation to compute.
#[derive(Debug, Clone)]
pub struct PivotRequest {
    pub id: RequestId,
    pub dataset: Dataset,
    pub spec: PivotSpec,
}

impl PivotRequest {
    pub fn new(id: RequestId, dataset: Dataset, spec: PivotSpec) -> Self {
        Self { id, dataset, spec }
    }

    /// Run the aggregation on the current thread.
    pub fn execute(&self) -> PivotResult<AggregationResult> {
        aggregate(&self.dataset, &self.spec)
    }
}

/// Outcome of a [`PivotRequest`], tagged with its id.
#[derive(Debug)]
pub struct PivotResponse {
    pub id: RequestId,
    pub outcome: WorkerResult<AggregationResult>,
}

impl PivotResponse {
    pub fn completed(id: RequestId, result: AggregationResult) -> Self {
        Self {
            id,
            outcome: Ok(result),
        }
    }

    pub fn failed(id: RequestId, error: impl Into<WorkerError>) -> Self {
        Self {
            id,
            outcome: Err(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Reply handle for one request.
///
/// Dropping it without calling [`ResponseSender::send`] delivers a
/// [`WorkerError::ChannelClosed`] failure for that request, so the receiver
/// never waits on a reply that cannot come.
#[derive(Debug)]
pub struct ResponseSender {
    id: RequestId,
    tx: Option<mpsc::UnboundedSender<PivotResponse>>,
}

impl ResponseSender {
    pub fn new(id: RequestId, tx: mpsc::UnboundedSender<PivotResponse>) -> Self {
        Self { id, tx: Some(tx) }
    }

    /// Id of the request this handle answers.
    pub fn request_id(&self) -> RequestId {
        self.id
    }

    /// Deliver the response. Hands it back if the receiver is gone.
    pub fn send(mut self, response: PivotResponse) -> Result<(), PivotResponse> {
        match self.tx.take() {
            Some(tx) => tx.send(response).map_err(|err| err.0),
            None => Err(response),
        }
    }
}

impl Drop for ResponseSender {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            tracing::debug!(request = %self.id, "reply dropped without a response");
            let _ = tx.send(PivotResponse::failed(self.id, WorkerError::ChannelClosed));
        }
    }
}
