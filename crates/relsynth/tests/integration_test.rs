//! Integration tests for relsynth.

use relsynth::dataset::{Dataset, Table, Value};
use relsynth::input::DataTable;
use relsynth::primitive::{
    CallOptions, Fit, GetParams, Hyperparams, MultiTableFeaturizer, Params, Produce, ReturnResult,
    SetParams,
};
use relsynth::schema::{ColumnMeta, ColumnRole, DeclaredType};
use relsynth::SynthError;

/// Customers with an optional label and a mostly-empty referral score.
fn customers(rows: &[(&str, &str, &str, &str)]) -> Table {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|(id, name, referral, label)| {
            vec![id.to_string(), name.to_string(), referral.to_string(), label.to_string()]
        })
        .collect();
    Table::new(
        "customers",
        vec![
            ColumnMeta::primary_key("customer_id"),
            ColumnMeta::new("name").with_type(DeclaredType::Categorical),
            ColumnMeta::new("referral").with_type(DeclaredType::Real),
            ColumnMeta::new("churned")
                .with_type(DeclaredType::Categorical)
                .with_roles(vec![ColumnRole::Target]),
        ],
        DataTable::new(
            vec![
                "customer_id".into(),
                "name".into(),
                "referral".into(),
                "churned".into(),
            ],
            rows,
        ),
    )
}

fn orders(rows: &[(&str, &str, &str)]) -> Table {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|(id, customer, amount)| vec![id.to_string(), customer.to_string(), amount.to_string()])
        .collect();
    Table::new(
        "orders",
        vec![
            ColumnMeta::primary_key("order_id"),
            ColumnMeta::new("customer_id").references("customers", "customer_id"),
            ColumnMeta::new("amount").with_type(DeclaredType::Real),
        ],
        DataTable::new(
            vec!["order_id".into(), "customer_id".into(), "amount".into()],
            rows,
        ),
    )
}

/// Four customers, three with exactly one order each.
fn shop() -> Dataset {
    Dataset::new("shop")
        .with_entry_point("customers")
        .with_table(customers(&[
            ("1", "alice", "", "yes"),
            ("2", "bob", "", "no"),
            ("3", "carol", "0.5", "no"),
            ("4", "dave", "", "yes"),
        ]))
        .with_table(orders(&[("10", "1", "20"), ("11", "2", "35"), ("12", "3", "50")]))
}

fn fitted(hp: Hyperparams, dataset: &Dataset) -> MultiTableFeaturizer {
    let mut featurizer = MultiTableFeaturizer::new(hp).expect("valid hyperparams");
    featurizer
        .fit(dataset, CallOptions::default())
        .expect("fit failed");
    featurizer
}

fn feature_names(featurizer: &MultiTableFeaturizer) -> Vec<String> {
    featurizer
        .fitted_state()
        .expect("fitted")
        .features
        .iter()
        .map(|f| f.name.clone())
        .collect()
}

// =============================================================================
// Orders / Customers Scenario
// =============================================================================

#[test]
fn test_aggregates_of_orders_created() {
    let permissive = Hyperparams {
        max_percent_null: 1.0,
        max_correlation: 1.0,
        ..Default::default()
    };
    let featurizer = fitted(permissive, &shop());
    let names = feature_names(&featurizer);

    assert!(names.contains(&"MEAN(orders.amount)".to_string()));
    assert!(names.contains(&"SUM(orders.amount)".to_string()));
    assert!(names.contains(&"COUNT(orders)".to_string()));
}

#[test]
fn test_default_pruning_on_shop() {
    let featurizer = fitted(Hyperparams::default(), &shop());
    let names = feature_names(&featurizer);

    // 3 of 4 referrals missing
    assert!(!names.contains(&"referral".to_string()));
    // SUM equals MEAN for single-order customers; MEAN is generated first
    assert!(names.contains(&"MEAN(orders.amount)".to_string()));
    assert!(!names.contains(&"SUM(orders.amount)".to_string()));
    // Constant over complete pairs, so never considered correlated
    assert!(names.contains(&"COUNT(orders)".to_string()));
    assert!(!names.contains(&"churned".to_string()));
}

#[test]
fn test_output_values() {
    let featurizer = fitted(Hyperparams::default(), &shop());
    let output = featurizer
        .produce(&shop(), CallOptions::default())
        .expect("produce failed")
        .value;

    assert_eq!(output.columns()[0].name, "customer_id");
    assert_eq!(output.columns().last().unwrap().name, "churned");
    assert_eq!(
        output.column("MEAN(orders.amount)").unwrap().values,
        vec![
            Value::Float(20.0),
            Value::Float(35.0),
            Value::Float(50.0),
            Value::Null
        ]
    );
    assert_eq!(
        output.column("COUNT(orders)").unwrap().values,
        vec![Value::Int(1), Value::Int(1), Value::Int(1), Value::Int(0)]
    );
}

// =============================================================================
// Row Order and Labels
// =============================================================================

#[test]
fn test_produce_follows_input_row_order() {
    let featurizer = fitted(Hyperparams::default(), &shop());

    let shuffled = Dataset::new("shop")
        .with_entry_point("customers")
        .with_table(customers(&[
            ("3", "carol", "", "a"),
            ("1", "alice", "", "b"),
            ("2", "bob", "", "c"),
        ]))
        .with_table(orders(&[("10", "1", "5"), ("11", "3", "7")]));

    let output = featurizer
        .produce(&shuffled, CallOptions::default())
        .unwrap()
        .value;

    assert_eq!(
        output.column("customer_id").unwrap().values,
        vec![Value::Int(3), Value::Int(1), Value::Int(2)]
    );
    assert_eq!(
        output.column("COUNT(orders)").unwrap().values,
        vec![Value::Int(1), Value::Int(1), Value::Int(0)]
    );
    assert_eq!(
        output.column("churned").unwrap().values,
        vec![Value::from("a"), Value::from("b"), Value::from("c")]
    );
}

#[test]
fn test_no_target_column_no_label() {
    let unlabeled = Table::new(
        "customers",
        vec![ColumnMeta::primary_key("customer_id")],
        DataTable::from_rows(&["customer_id", "age"], &[&["1", "30"], &["2", "40"]]),
    );
    let dataset = Dataset::new("plain").with_table(unlabeled);
    let featurizer = fitted(Hyperparams::default(), &dataset);
    let output = featurizer
        .produce(&dataset, CallOptions::default())
        .unwrap()
        .value;
    assert_eq!(output.column_names(), vec!["customer_id", "age"]);
}

#[test]
fn test_duplicate_primary_key_is_fatal() {
    let featurizer = fitted(Hyperparams::default(), &shop());
    let duplicated = Dataset::new("shop")
        .with_entry_point("customers")
        .with_table(customers(&[("1", "a", "", "x"), ("1", "b", "", "y")]))
        .with_table(orders(&[]));

    let err = featurizer
        .produce(&duplicated, CallOptions::default())
        .unwrap_err();
    match err {
        SynthError::Construction { resource, message } => {
            assert_eq!(resource, "customers");
            assert!(message.contains("duplicate"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_produce_before_fit_fails() {
    let featurizer = MultiTableFeaturizer::new(Hyperparams::default()).unwrap();
    let err = featurizer
        .produce(&shop(), CallOptions::default())
        .unwrap_err();
    assert!(matches!(err, SynthError::NotFitted));
}

#[test]
fn test_missing_primary_key_names_table() {
    let keyless = Table::new(
        "events",
        vec![],
        DataTable::from_rows(&["kind", "value"], &[&["a", "1"]]),
    );
    let dataset = Dataset::new("broken")
        .with_entry_point("customers")
        .with_table(customers(&[("1", "alice", "", "yes")]))
        .with_table(keyless);

    let mut featurizer = MultiTableFeaturizer::new(Hyperparams::default()).unwrap();
    let err = featurizer
        .fit(&dataset, CallOptions::default())
        .unwrap_err();
    match err {
        SynthError::Construction { resource, .. } => assert_eq!(resource, "events"),
        other => panic!("unexpected error: {}", other),
    }
    assert!(!featurizer.is_fitted());
}

#[test]
fn test_unknown_target_resource() {
    let hp = Hyperparams {
        target_resource: Some("nope".into()),
        ..Default::default()
    };
    let mut featurizer = MultiTableFeaturizer::new(hp).unwrap();
    let err = featurizer.fit(&shop(), CallOptions::default()).unwrap_err();
    assert!(matches!(err, SynthError::Construction { .. }));
}

#[test]
fn test_hyperparam_validation() {
    for hp in [
        Hyperparams {
            max_percent_null: -0.1,
            ..Default::default()
        },
        Hyperparams {
            max_correlation: 1.1,
            ..Default::default()
        },
        Hyperparams {
            max_depth: 0,
            ..Default::default()
        },
    ] {
        assert!(matches!(
            MultiTableFeaturizer::new(hp),
            Err(SynthError::Config(_))
        ));
    }
}

// =============================================================================
// Null Filter Edge Case
// =============================================================================

#[test]
fn test_single_all_null_column() {
    let table = Table::new(
        "readings",
        vec![
            ColumnMeta::primary_key("id"),
            ColumnMeta::new("value").with_type(DeclaredType::Real),
        ],
        DataTable::from_rows(&["id", "value"], &[&["1", ""], &["2", "NA"], &["3", ""]]),
    );
    let dataset = Dataset::new("empty").with_table(table);

    let strict = fitted(
        Hyperparams {
            max_percent_null: 0.99,
            ..Default::default()
        },
        &dataset,
    );
    assert!(feature_names(&strict).is_empty());

    let lenient = fitted(
        Hyperparams {
            max_percent_null: 1.0,
            ..Default::default()
        },
        &dataset,
    );
    assert_eq!(feature_names(&lenient), vec!["value"]);
}

// =============================================================================
// Column Selection
// =============================================================================

#[test]
fn test_use_columns_restricts_inputs() {
    let hp = Hyperparams {
        use_columns: vec![0, 1],
        max_percent_null: 1.0,
        ..Default::default()
    };
    let names = feature_names(&fitted(hp, &shop()));
    assert!(names.contains(&"name".to_string()));
    assert!(!names.contains(&"referral".to_string()));
    // Child tables are unaffected
    assert!(names.contains(&"MEAN(orders.amount)".to_string()));
}

#[test]
fn test_exclude_columns() {
    let hp = Hyperparams {
        exclude_columns: vec![1, 99],
        max_percent_null: 1.0,
        ..Default::default()
    };
    let names = feature_names(&fitted(hp, &shop()));
    assert!(!names.contains(&"name".to_string()));
    assert!(names.contains(&"referral".to_string()));
}

// =============================================================================
// Params and Output Shapes
// =============================================================================

#[test]
fn test_params_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("params.json");

    let featurizer = fitted(Hyperparams::default(), &shop());
    featurizer.get_params().save(&path).unwrap();

    let mut restored = MultiTableFeaturizer::new(Hyperparams::default()).unwrap();
    restored.set_params(Params::load(&path).unwrap()).unwrap();

    let expected = featurizer.produce(&shop(), CallOptions::default()).unwrap();
    let actual = restored.produce(&shop(), CallOptions::default()).unwrap();
    assert_eq!(actual.value, expected.value);
}

#[test]
fn test_append_keeps_original_columns() {
    let hp = Hyperparams {
        return_result: ReturnResult::Append,
        ..Default::default()
    };
    let output = fitted(hp, &shop())
        .produce(&shop(), CallOptions::default())
        .unwrap()
        .value;
    let names = output.column_names();
    assert_eq!(&names[..4], &["customer_id", "name", "referral", "churned"]);
    assert!(names.contains(&"MEAN(orders.amount)"));
}

#[test]
fn test_replace_swaps_attributes() {
    let hp = Hyperparams {
        return_result: ReturnResult::Replace,
        ..Default::default()
    };
    let output = fitted(hp, &shop())
        .produce(&shop(), CallOptions::default())
        .unwrap()
        .value;
    let names = output.column_names();
    assert_eq!(names[0], "customer_id");
    assert_eq!(names[1], "name");
    assert!(!names.contains(&"referral"));
    assert_eq!(*names.last().unwrap(), "churned");
}
