use carrier_pivot::model::{Dataset, Scalar};
use carrier_pivot::pivot::{aggregate, coerce, Aggregation, AxisSets, DateBucket, PivotSpec};
use proptest::prelude::*;

const FIELDS: [&str; 4] = ["Entity", "Status", "Created_DT", "Units"];

fn scalar_value() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        Just(Scalar::Absent),
        Just(Scalar::text("-")),
        (0i32..1000).prop_map(|n| Scalar::text(n.to_string())),
        (-50i32..50).prop_map(|n| Scalar::Number(n as f64)),
        "[a-z]{1,6}".prop_map(Scalar::text),
    ]
}

fn row() -> impl Strategy<Value = Vec<Scalar>> {
    (
        prop_oneof![Just("CARRIER"), Just("BROKER"), Just("SHIPPER")].prop_map(Scalar::text),
        prop_oneof![Just("Authorized"), Just("Not Authorized"), Just("-")].prop_map(Scalar::text),
        prop_oneof![
            Just(Scalar::text("2024-07-20")),
            Just(Scalar::text("2023-12-31")),
            Just(Scalar::text("not a date")),
            Just(Scalar::Absent),
        ],
        scalar_value(),
    )
        .prop_map(|(entity, status, created, units)| vec![entity, status, created, units])
}

fn dataset_and_order() -> impl Strategy<Value = (Vec<Vec<Scalar>>, Vec<usize>)> {
    prop::collection::vec(row(), 0..40).prop_flat_map(|rows| {
        let order: Vec<usize> = (0..rows.len()).collect();
        (Just(rows), Just(order).prop_shuffle())
    })
}

fn bucket() -> impl Strategy<Value = DateBucket> {
    prop::sample::select(DateBucket::ALL.to_vec())
}

fn spec(aggregation: Aggregation, bucket: DateBucket) -> PivotSpec {
    PivotSpec::new(["Entity", "Created_DT"], "Units")
        .with_columns(["Status"])
        .with_aggregation(aggregation)
        .with_date_bucket(bucket)
}

proptest! {
    #[test]
    fn aggregate_is_permutation_invariant(
        (records, order) in dataset_and_order(),
        bucket in bucket(),
        count in any::<bool>(),
    ) {
        let aggregation = if count { Aggregation::Count } else { Aggregation::Sum };
        let dataset = Dataset::from_records(FIELDS, records).unwrap();
        let shuffled = dataset.reorder(&order);
        let spec = spec(aggregation, bucket);

        // Integer-valued inputs keep float addition exact in any order.
        prop_assert_eq!(aggregate(&dataset, &spec).unwrap(), aggregate(&shuffled, &spec).unwrap());
    }

    #[test]
    fn sum_total_matches_coerced_values((records, _) in dataset_and_order(), bucket in bucket()) {
        let dataset = Dataset::from_records(FIELDS, records).unwrap();
        let units = dataset.field("Units").unwrap();
        let expected: f64 = dataset.rows().iter().map(|row| coerce(row.get(units))).sum();

        let result = aggregate(&dataset, &spec(Aggregation::Sum, bucket)).unwrap();
        prop_assert_eq!(result.total(), expected);
    }

    #[test]
    fn count_total_matches_row_count((records, _) in dataset_and_order(), bucket in bucket()) {
        let dataset = Dataset::from_records(FIELDS, records).unwrap();
        let result = aggregate(&dataset, &spec(Aggregation::Count, bucket)).unwrap();
        prop_assert_eq!(result.total(), dataset.len() as f64);
        prop_assert!(result.cells().all(|(_, _, v)| v >= 1.0));
    }

    #[test]
    fn axes_cover_every_result_cell((records, _) in dataset_and_order(), bucket in bucket()) {
        let dataset = Dataset::from_records(FIELDS, records).unwrap();
        let spec = spec(Aggregation::Count, bucket);
        let result = aggregate(&dataset, &spec).unwrap();
        let axes = AxisSets::derive(&dataset, &spec).unwrap();

        for (row, column, _) in result.cells() {
            prop_assert!(axes.row_keys.iter().any(|k| k == row));
            prop_assert!(axes.column_keys.iter().any(|k| k == column));
        }
        prop_assert_eq!(axes.row_keys.len(), result.row_count());
    }
}
