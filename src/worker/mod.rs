//! Execution boundary for pivot computations.
//!
//! The controller never runs an aggregation itself. It hands a
//! [`PivotRequest`](protocol::PivotRequest) to an [`Executor`] together with
//! a reply channel, and picks the tagged response up later:
//!
//! ```text
//! ┌──────────────────────────┐   PivotRequest { id, rows, spec }   ┌──────────────────────────┐
//! │     PivotController      │ ──────────────────────────────────► │   Executor               │
//! │  - active RequestId      │                                     │  - WorkerClient: tokio   │
//! │  - inbox (mpsc receiver) │ ◄────────────────────────────────── │    blocking pool         │
//! └──────────────────────────┘   PivotResponse { id, outcome }     │  - InlineExecutor        │
//!                                                                  └──────────────────────────┘
//! ```
//!
//! Executors keep no state between requests, and responses may arrive in any
//! order; discarding stale ones is the receiver's job.
//!
//! # Example
//!
//! ```ignore
//! use carrier_pivot::worker::WorkerClient;
//!
//! let client = WorkerClient::new()?;
//! let result = client.request(&dataset, &spec).await?;
//! ```

mod client;
mod error;
pub mod protocol;

use std::sync::Arc;

pub use client::WorkerClient;
pub use error::{WorkerError, WorkerResult};
pub use protocol::{PivotRequest, PivotResponse, RequestId, RequestSequence, ResponseSender};

/// Runs pivot requests and reports each outcome on `reply`.
///
/// `dispatch` must not block the caller on the computation. An executor
/// that drops `reply` unanswered reports the request as failed.
pub trait Executor: Send + Sync {
    fn dispatch(&self, request: PivotRequest, reply: ResponseSender);
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn dispatch(&self, request: PivotRequest, reply: ResponseSender) {
        (**self).dispatch(request, reply)
    }
}

/// Computes on the calling thread and replies immediately.
///
/// Useful where no runtime exists and in tests that need deterministic
/// delivery.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn dispatch(&self, request: PivotRequest, reply: ResponseSender) {
        let response = match request.execute() {
            Ok(result) => PivotResponse::completed(request.id, result),
            Err(err) => PivotResponse::failed(request.id, err),
        };
        // The receiver may already be gone; nothing is waiting then.
        let _ = reply.send(response);
    }
}
