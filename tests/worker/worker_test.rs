#[cfg(test)]
mod tests {
    use carrier_pivot::config::WorkerSettings;
    use carrier_pivot::model::Dataset;
    use carrier_pivot::pivot::{Aggregation, FieldRole, PivotError, PivotSpec};
    use carrier_pivot::worker::{
        Executor, InlineExecutor, PivotRequest, RequestSequence, ResponseSender, WorkerClient,
        WorkerError,
    };
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn carriers() -> Dataset {
        Dataset::from_json_str(
            r#"[
                {"Entity": "CARRIER", "Status": "Authorized", "Units": "10"},
                {"Entity": "CARRIER", "Status": "Not Authorized", "Units": "-"},
                {"Entity": "BROKER", "Status": "Authorized", "Units": "5"}
            ]"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_request_returns_result() {
        let client = WorkerClient::new().unwrap();
        let spec = PivotSpec::new(["Entity"], "Units").with_columns(["Status"]);
        let result = client.request(&carriers(), &spec).await.unwrap();
        assert_eq!(result.value("CARRIER", "Authorized"), 10.0);
        assert_eq!(result.value("BROKER", "Authorized"), 5.0);
    }

    #[tokio::test]
    async fn test_request_reports_invalid_spec() {
        let client = WorkerClient::new().unwrap();
        let spec = PivotSpec::new(["Entity"], "Drivers");
        let err = client.request(&carriers(), &spec).await.unwrap_err();
        assert!(matches!(
            err,
            WorkerError::Pivot(PivotError::UnknownField { role: FieldRole::Value, .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dispatch_tags_responses() {
        let settings = WorkerSettings {
            timeout_secs: 5,
            max_concurrent: 1,
        };
        let client = WorkerClient::with_settings(&settings).unwrap();
        let sequence = RequestSequence::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let sum = PivotSpec::new(["Entity"], "Units");
        let count = sum.clone().with_aggregation(Aggregation::Count);
        let first = sequence.next();
        let second = sequence.next();
        client.dispatch(
            PivotRequest::new(first, carriers(), sum),
            ResponseSender::new(first, tx.clone()),
        );
        client.dispatch(
            PivotRequest::new(second, carriers(), count),
            ResponseSender::new(second, tx),
        );

        let mut responses = Vec::new();
        while let Some(response) = rx.recv().await {
            responses.push(response);
        }
        responses.sort_by_key(|r| r.id);

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].id, first);
        let sum_result = responses[0].outcome.as_ref().unwrap();
        let count_result = responses[1].outcome.as_ref().unwrap();
        assert_eq!(sum_result.value("CARRIER", ""), 10.0);
        assert_eq!(count_result.value("CARRIER", ""), 2.0);
    }

    #[test]
    fn test_inline_executor_replies_immediately() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = RequestSequence::new().next();
        InlineExecutor.dispatch(
            PivotRequest::new(id, carriers(), PivotSpec::new(["Status"], "Units")),
            ResponseSender::new(id, tx),
        );

        let response = rx.try_recv().unwrap();
        assert_eq!(response.id, id);
        assert!(response.is_success());
        let result = response.outcome.unwrap();
        assert_eq!(result.value("Authorized", ""), 15.0);
    }

    #[tokio::test]
    async fn test_timeout_setting() {
        let mut client = WorkerClient::new().unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(30));
        client.set_timeout(Duration::from_secs(1));
        assert_eq!(client.timeout(), Duration::from_secs(1));
    }
}
