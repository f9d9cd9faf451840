#[cfg(test)]
mod tests {
    use carrier_pivot::model::{Dataset, Scalar};
    use carrier_pivot::pivot::{coerce, is_numeric_field, FieldRole, PivotError};

    #[test]
    fn test_placeholder_and_absent_are_zero() {
        assert_eq!(coerce(&Scalar::text("-")), 0.0);
        assert_eq!(coerce(&Scalar::Absent), 0.0);
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(coerce(&Scalar::text("12.5")), 12.5);
        assert_eq!(coerce(&Scalar::text(" 7")), 7.0);
        assert_eq!(coerce(&Scalar::text("3 trucks")), 3.0);
    }

    #[test]
    fn test_non_numeric_strings_are_zero() {
        assert_eq!(coerce(&Scalar::text("abc")), 0.0);
        assert_eq!(coerce(&Scalar::text("")), 0.0);
        assert_eq!(coerce(&Scalar::text("Infinity")), 0.0);
        assert_eq!(coerce(&Scalar::text("NaN")), 0.0);
    }

    #[test]
    fn test_numbers_pass_through() {
        assert_eq!(coerce(&Scalar::Number(42.0)), 42.0);
        assert_eq!(coerce(&Scalar::Number(f64::INFINITY)), 0.0);
    }

    #[test]
    fn test_numeric_field_eligibility() {
        let dataset = Dataset::from_json_str(
            r#"[
                {"Power units": "10", "Drivers": 3, "Entity": "CARRIER"},
                {"Power units": "-", "Drivers": null, "Entity": "BROKER"},
                {"Power units": "2.5", "Drivers": "4", "Entity": "-"}
            ]"#,
        )
        .unwrap();

        assert!(is_numeric_field(&dataset, "Power units").unwrap());
        assert!(is_numeric_field(&dataset, "Drivers").unwrap());
        assert!(!is_numeric_field(&dataset, "Entity").unwrap());
        assert_eq!(
            is_numeric_field(&dataset, "Phone").unwrap_err(),
            PivotError::unknown_field(FieldRole::Value, "Phone")
        );
    }
}
