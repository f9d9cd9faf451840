#[cfg(test)]
mod tests {
    use carrier_pivot::controller::{Delivery, PivotController, PivotState, PivotView};
    use carrier_pivot::filter::RowFilter;
    use carrier_pivot::model::Dataset;
    use carrier_pivot::pivot::{Aggregation, AggregationResult, DateBucket, PivotError, PivotSpec};
    use carrier_pivot::worker::{
        Executor, PivotRequest, PivotResponse, RequestId, ResponseSender, WorkerClient, WorkerError,
    };
    use std::sync::{Arc, Mutex};

    /// Holds requests until the test decides when, and in which order, they finish.
    #[derive(Default)]
    struct ManualExecutor {
        pending: Mutex<Vec<(PivotRequest, ResponseSender)>>,
    }

    impl Executor for ManualExecutor {
        fn dispatch(&self, request: PivotRequest, reply: ResponseSender) {
            self.pending.lock().unwrap().push((request, reply));
        }
    }

    impl ManualExecutor {
        fn ids(&self) -> Vec<RequestId> {
            self.pending.lock().unwrap().iter().map(|(r, _)| r.id).collect()
        }

        fn take(&self, id: RequestId) -> (PivotRequest, ResponseSender) {
            let mut pending = self.pending.lock().unwrap();
            let index = pending.iter().position(|(r, _)| r.id == id).unwrap();
            pending.remove(index)
        }

        fn complete(&self, id: RequestId) {
            let (request, reply) = self.take(id);
            let response = match request.execute() {
                Ok(result) => PivotResponse::completed(request.id, result),
                Err(err) => PivotResponse::failed(request.id, err),
            };
            reply.send(response).unwrap();
        }

        fn fail(&self, id: RequestId) {
            let (request, reply) = self.take(id);
            reply
                .send(PivotResponse::failed(
                    request.id,
                    WorkerError::TaskFailed("worker crashed".into()),
                ))
                .unwrap();
        }
    }

    /// Loses every request without answering it.
    struct DroppingExecutor;

    impl Executor for DroppingExecutor {
        fn dispatch(&self, _request: PivotRequest, reply: ResponseSender) {
            drop(reply);
        }
    }

    fn carriers() -> Dataset {
        Dataset::from_json_str(
            r#"[
                {"Entity": "CARRIER", "Status": "Authorized", "Units": "10", "Created_DT": "2024-07-20"},
                {"Entity": "CARRIER", "Status": "Not Authorized", "Units": "-", "Created_DT": "2024-08-02"},
                {"Entity": "BROKER", "Status": "Authorized", "Units": "5", "Created_DT": "2023-01-01"}
            ]"#,
        )
        .unwrap()
    }

    fn spec() -> PivotSpec {
        PivotSpec::new(["Entity"], "Units").with_columns(["Status"])
    }

    fn controller() -> (Arc<ManualExecutor>, PivotController<Arc<ManualExecutor>>) {
        let executor = Arc::new(ManualExecutor::default());
        let controller = PivotController::new(Arc::clone(&executor), carriers(), spec()).unwrap();
        (executor, controller)
    }

    #[test]
    fn test_loading_until_adopted() {
        let (executor, mut controller) = controller();
        let ids = executor.ids();
        assert_eq!(ids.len(), 1);
        assert_eq!(controller.state(), PivotState::Computing(ids[0]));
        assert!(controller.view().is_loading());
        assert!(controller.try_deliver().is_none());

        executor.complete(ids[0]);
        assert_eq!(controller.try_deliver(), Some(Delivery::Adopted(ids[0])));
        assert_eq!(controller.state(), PivotState::Idle);
        assert_eq!(controller.result().value("CARRIER", "Authorized"), 10.0);
        assert_eq!(controller.axes().column_keys, ["Authorized", "Not Authorized"]);
    }

    #[test]
    fn test_stale_response_arriving_late_is_discarded() {
        let (executor, mut controller) = controller();
        let count = controller.set_aggregation(Aggregation::Count);
        let ids = executor.ids();
        let sum = ids[0];
        assert_eq!(ids[1], count);

        // A finishes after B was dispatched.
        executor.complete(sum);
        assert_eq!(controller.try_deliver(), Some(Delivery::Discarded(sum)));
        assert!(controller.is_loading());
        assert!(controller.result().is_empty());

        executor.complete(count);
        assert_eq!(controller.try_deliver(), Some(Delivery::Adopted(count)));
        assert_eq!(controller.result().value("CARRIER", "Authorized"), 1.0);
        assert_eq!(controller.result().value("CARRIER", "Not Authorized"), 1.0);
        assert_eq!(controller.discarded(), 1);
    }

    #[test]
    fn test_stale_response_after_adoption_is_discarded() {
        let (executor, mut controller) = controller();
        let sum = executor.ids()[0];
        let count = controller.set_aggregation(Aggregation::Count);

        executor.complete(count);
        executor.complete(sum);
        assert_eq!(controller.try_deliver(), Some(Delivery::Adopted(count)));
        assert_eq!(controller.try_deliver(), Some(Delivery::Discarded(sum)));

        let expected = AggregationResult::from_cells([
            ("CARRIER", "Authorized", 1.0),
            ("CARRIER", "Not Authorized", 1.0),
            ("BROKER", "Authorized", 1.0),
        ]);
        assert_eq!(controller.result(), &expected);
        assert_eq!(controller.state(), PivotState::Idle);
    }

    #[test]
    fn test_every_mutation_dispatches() {
        let (executor, mut controller) = controller();
        controller.set_row_dimensions(["Status"]).unwrap();
        controller.set_column_dimensions(["Entity"]).unwrap();
        controller.set_value_field("Units").unwrap();
        controller.set_aggregation(Aggregation::Sum);
        controller.set_date_bucket(DateBucket::Month);
        controller.set_spec(spec()).unwrap();
        controller.set_dataset(carriers()).unwrap();

        let ids = executor.ids();
        assert_eq!(ids.len(), 8);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(controller.active_request(), ids.last().copied());
    }

    #[test]
    fn test_invalid_mutation_does_not_dispatch() {
        let (executor, mut controller) = controller();
        assert_eq!(
            controller.set_row_dimensions(Vec::<String>::new()),
            Err(PivotError::NoRowDimensions)
        );
        assert!(controller.set_column_dimensions(["Phone"]).is_err());
        assert_eq!(executor.ids().len(), 1);
        assert_eq!(controller.spec(), &spec());
    }

    #[test]
    fn test_date_bucket_changes_axes() {
        let (executor, mut controller) = controller();
        let id = controller.set_row_dimensions(["Created_DT"]).unwrap();
        controller.set_date_bucket(DateBucket::Year);
        let bucketed = controller.active_request().unwrap();
        assert_ne!(id, bucketed);

        executor.complete(bucketed);
        while controller.try_deliver().is_some() {}
        assert_eq!(controller.axes().row_keys, ["2024", "2023"]);
        assert_eq!(controller.result().value("2024", "Authorized"), 10.0);
    }

    #[test]
    fn test_failed_computation_is_exposed() {
        let (executor, mut controller) = controller();
        let id = executor.ids()[0];
        executor.fail(id);

        assert_eq!(controller.try_deliver(), Some(Delivery::Adopted(id)));
        let view = controller.view();
        assert!(!view.is_loading());
        assert!(view.result.is_empty());
        assert!(matches!(view.error, Some(WorkerError::TaskFailed(_))));

        // The next dispatch clears the error.
        controller.set_aggregation(Aggregation::Count);
        assert!(controller.error().is_none());
    }

    #[test]
    fn test_observer_sees_every_transition() {
        let (executor, mut controller) = controller();
        let seen: Arc<Mutex<Vec<(bool, f64)>>> = Arc::default();
        let sink = Arc::clone(&seen);
        controller.observe(move |view: &PivotView<'_>| {
            sink.lock().unwrap().push((view.is_loading(), view.result.total()));
        });

        let count = controller.set_aggregation(Aggregation::Count);
        executor.complete(executor.ids()[0]);
        executor.complete(count);
        while controller.try_deliver().is_some() {}

        // Registration, dispatch, adoption. The stale response is silent.
        assert_eq!(*seen.lock().unwrap(), vec![(true, 0.0), (true, 0.0), (false, 3.0)]);
    }

    #[test]
    fn test_filtered_dataset_recomputes() {
        let (executor, mut controller) = controller();
        let filtered = RowFilter::new()
            .with_field("Entity", "broker")
            .apply(controller.dataset())
            .unwrap();
        let id = controller.set_dataset(filtered).unwrap();
        executor.complete(id);
        while controller.try_deliver().is_some() {}

        assert_eq!(controller.axes().row_keys, ["BROKER"]);
        assert_eq!(controller.view().grid().grand_total, 5.0);
    }

    #[tokio::test]
    async fn test_settle_with_worker_client() {
        let client = WorkerClient::new().unwrap();
        let mut controller = PivotController::new(client, carriers(), spec()).unwrap();
        controller.set_aggregation(Aggregation::Count);

        let view = controller.settle().await;
        assert_eq!(view.state, PivotState::Idle);
        assert!(view.error.is_none());
        assert_eq!(view.value("CARRIER", "Not Authorized"), 1.0);
        assert_eq!(view.value("BROKER", "Not Authorized"), 0.0);
        assert_eq!(view.result.total(), 3.0);
    }

    #[tokio::test]
    async fn test_settle_when_reply_is_dropped() {
        let mut controller = PivotController::new(DroppingExecutor, carriers(), spec()).unwrap();
        let view = tokio::time::timeout(std::time::Duration::from_secs(5), controller.settle())
            .await
            .unwrap();
        assert_eq!(view.state, PivotState::Idle);
        assert!(view.result.is_empty());
        assert!(matches!(view.error, Some(WorkerError::ChannelClosed)));
    }

    #[test]
    fn test_dropped_stale_reply_is_discarded() {
        let (executor, mut controller) = controller();
        let first = executor.ids()[0];
        let second = controller.set_aggregation(Aggregation::Count);

        drop(executor.take(first));
        assert_eq!(controller.try_deliver(), Some(Delivery::Discarded(first)));
        assert_eq!(controller.state(), PivotState::Computing(second));
        assert!(controller.error().is_none());
    }

    #[tokio::test]
    async fn test_settle_on_empty_json_dataset() {
        let dataset = Dataset::from_json_str("[]").unwrap();
        let client = WorkerClient::new().unwrap();
        let mut controller = PivotController::new(client, dataset, spec()).unwrap();

        let view = controller.settle().await;
        assert_eq!(view.state, PivotState::Idle);
        assert!(view.error.is_none());
        assert!(view.result.is_empty());
        assert!(view.axes.is_empty());
        assert_eq!(view.grid().grand_total, 0.0);
    }
}
