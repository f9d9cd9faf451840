//! Worker-specific error types.

use thiserror::Error;

use crate::pivot::PivotError;

/// Result type for worker operations.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors that can occur while computing a pivot off the caller's path.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The worker was created outside a tokio runtime.
    #[error("no tokio runtime available for the pivot worker: {0}")]
    NoRuntime(#[source] tokio::runtime::TryCurrentError),

    /// Request timed out waiting for response.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Response channel was closed before a result arrived.
    #[error("response channel closed unexpectedly")]
    ChannelClosed,

    /// The computation task panicked or was cancelled.
    #[error("pivot computation failed: {0}")]
    TaskFailed(String),

    /// The request itself was invalid for the dataset.
    #[error(transparent)]
    Pivot(#[from] PivotError),
}

impl WorkerError {
    /// Check if this error is retriable.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::ChannelClosed)
    }
}

impl From<tokio::task::JoinError> for WorkerError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskFailed(err.to_string())
    }
}
