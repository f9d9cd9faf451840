//! Pivot controller.
//!
//! Owns the current [`PivotSpec`] and dataset, sends a request across the
//! execution boundary on every change, and adopts only the response to the
//! latest request. Responses to superseded requests are dropped on arrival.
//!
//! ```text
//!            set_* / set_dataset                 response (active id)
//!   ┌──────┐ ───────────────────► ┌───────────┐ ────────────────────► ┌──────┐
//!   │ Idle │                      │ Computing │                       │ Idle │
//!   └──────┘                      └───────────┘                       └──────┘
//!                                   │      ▲
//!                                   └──────┘ set_* (fresh id, old result dropped)
//! ```

use tokio::sync::mpsc;

use crate::model::Dataset;
use crate::pivot::{
    Aggregation, AggregationResult, AxisSets, DateBucket, PivotGrid, PivotResult, PivotSpec,
};
use crate::worker::{
    Executor, PivotRequest, PivotResponse, RequestId, RequestSequence, ResponseSender, WorkerClient,
    WorkerError,
};

/// Computation state of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotState {
    /// The exposed result matches the current spec and dataset.
    Idle,
    /// A computation for the current spec is outstanding.
    Computing(RequestId),
}

/// What happened to a delivered response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Adopted(RequestId),
    Discarded(RequestId),
}

type Observer = Box<dyn FnMut(&PivotView<'_>) + Send>;

/// Read model handed to observers and callers.
#[derive(Debug, Clone, Copy)]
pub struct PivotView<'a> {
    pub state: PivotState,
    pub spec: &'a PivotSpec,
    pub result: &'a AggregationResult,
    pub axes: &'a AxisSets,
    pub error: Option<&'a WorkerError>,
}

impl PivotView<'_> {
    pub fn is_loading(&self) -> bool {
        matches!(self.state, PivotState::Computing(_))
    }

    /// Cell value, zero when the pair never co-occurred.
    pub fn value(&self, row_key: &str, column_key: &str) -> f64 {
        self.result.value(row_key, column_key)
    }

    pub fn grid(&self) -> PivotGrid {
        PivotGrid::build(self.spec, self.result, self.axes)
    }
}

pub struct PivotController<E: Executor = WorkerClient> {
    executor: E,
    dataset: Dataset,
    spec: PivotSpec,
    state: PivotState,
    sequence: RequestSequence,
    result: AggregationResult,
    axes: AxisSets,
    error: Option<WorkerError>,
    replies: mpsc::UnboundedSender<PivotResponse>,
    inbox: mpsc::UnboundedReceiver<PivotResponse>,
    observer: Option<Observer>,
    discarded: u64,
}

impl<E: Executor> PivotController<E> {
    /// Validate `spec` against `dataset` and dispatch the first computation.
    pub fn new(executor: E, dataset: Dataset, spec: PivotSpec) -> PivotResult<Self> {
        spec.validate_for(&dataset)?;
        let (replies, inbox) = mpsc::unbounded_channel();
        let mut controller = Self {
            executor,
            dataset,
            spec,
            state: PivotState::Idle,
            sequence: RequestSequence::new(),
            result: AggregationResult::default(),
            axes: AxisSets::default(),
            error: None,
            replies,
            inbox,
            observer: None,
            discarded: 0,
        };
        controller.dispatch();
        Ok(controller)
    }

    /// Register an observer, called now and on every later transition.
    pub fn observe<F>(&mut self, observer: F)
    where
        F: FnMut(&PivotView<'_>) + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
        self.notify();
    }

    pub fn set_row_dimensions<I, S>(&mut self, rows: I) -> PivotResult<RequestId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec = self.spec.clone();
        spec.row_dimensions = rows.into_iter().map(Into::into).collect();
        self.set_spec(spec)
    }

    pub fn set_column_dimensions<I, S>(&mut self, columns: I) -> PivotResult<RequestId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = self.spec.clone().with_columns(columns);
        self.set_spec(spec)
    }

    pub fn set_value_field(&mut self, field: impl Into<String>) -> PivotResult<RequestId> {
        let mut spec = self.spec.clone();
        spec.value_field = field.into();
        self.set_spec(spec)
    }

    pub fn set_aggregation(&mut self, aggregation: Aggregation) -> RequestId {
        self.spec.aggregation = aggregation;
        self.dispatch()
    }

    pub fn set_date_bucket(&mut self, bucket: DateBucket) -> RequestId {
        self.spec.date_bucket = bucket;
        self.dispatch()
    }

    /// Replace the whole spec. An invalid spec leaves the controller as it was.
    pub fn set_spec(&mut self, spec: PivotSpec) -> PivotResult<RequestId> {
        spec.validate_for(&self.dataset)?;
        self.spec = spec;
        Ok(self.dispatch())
    }

    /// Swap in a new row set, e.g. after a filter change.
    pub fn set_dataset(&mut self, dataset: Dataset) -> PivotResult<RequestId> {
        self.spec.validate_for(&dataset)?;
        self.dataset = dataset;
        Ok(self.dispatch())
    }

    /// Handle one response if one is already waiting.
    pub fn try_deliver(&mut self) -> Option<Delivery> {
        let response = self.inbox.try_recv().ok()?;
        Some(self.receive(response))
    }

    /// Wait for the next response and handle it.
    pub async fn deliver(&mut self) -> Option<Delivery> {
        let response = self.inbox.recv().await?;
        Some(self.receive(response))
    }

    /// Deliver responses until the active request has been adopted.
    ///
    /// Every dispatched request is answered, either by its executor or by a
    /// [`WorkerError::ChannelClosed`] failure when the reply is dropped.
    pub async fn settle(&mut self) -> PivotView<'_> {
        while self.is_loading() {
            if self.deliver().await.is_none() {
                break;
            }
        }
        self.view()
    }

    pub fn view(&self) -> PivotView<'_> {
        PivotView {
            state: self.state,
            spec: &self.spec,
            result: &self.result,
            axes: &self.axes,
            error: self.error.as_ref(),
        }
    }

    pub fn state(&self) -> PivotState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, PivotState::Computing(_))
    }

    pub fn active_request(&self) -> Option<RequestId> {
        match self.state {
            PivotState::Computing(id) => Some(id),
            PivotState::Idle => None,
        }
    }

    pub fn spec(&self) -> &PivotSpec {
        &self.spec
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn result(&self) -> &AggregationResult {
        &self.result
    }

    pub fn axes(&self) -> &AxisSets {
        &self.axes
    }

    pub fn error(&self) -> Option<&WorkerError> {
        self.error.as_ref()
    }

    /// Responses dropped because a newer request had been dispatched.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    fn dispatch(&mut self) -> RequestId {
        let id = self.sequence.next();
        self.state = PivotState::Computing(id);
        self.result = AggregationResult::default();
        self.axes = AxisSets::default();
        self.error = None;

        tracing::debug!(request = %id, rows = self.dataset.len(), "dispatching pivot request");
        let request = PivotRequest::new(id, self.dataset.clone(), self.spec.clone());
        self.executor
            .dispatch(request, ResponseSender::new(id, self.replies.clone()));
        self.notify();
        id
    }

    fn receive(&mut self, response: PivotResponse) -> Delivery {
        let id = response.id;
        if self.active_request() != Some(id) {
            self.discarded += 1;
            tracing::debug!(request = %id, "discarding stale pivot response");
            return Delivery::Discarded(id);
        }

        match response.outcome {
            Ok(result) => match AxisSets::derive(&self.dataset, &self.spec) {
                Ok(axes) => {
                    tracing::debug!(request = %id, cells = result.cell_count(), "adopted pivot result");
                    self.result = result;
                    self.axes = axes;
                }
                Err(err) => self.error = Some(err.into()),
            },
            Err(err) => {
                tracing::warn!(request = %id, error = %err, "pivot computation failed");
                self.error = Some(err);
            }
        }
        self.state = PivotState::Idle;
        self.notify();
        Delivery::Adopted(id)
    }

    fn notify(&mut self) {
        if let Some(mut observer) = self.observer.take() {
            observer(&self.view());
            self.observer = Some(observer);
        }
    }
}
