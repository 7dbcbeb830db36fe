//! Property-based tests for the feature pruning filters.
//!
//! These tests use proptest to generate random feature matrices and check
//! that the filters keep their invariants for any input.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p relsynth --test property_tests
//!
//! # More cases
//! PROPTEST_CASES=10000 cargo test -p relsynth --test property_tests
//! ```

use proptest::prelude::*;

use relsynth::dataset::Value;
use relsynth::prune::{drop_percent_null, select_one_of_correlated, PruneConfig, Pruner};
use relsynth::schema::VariableType;
use relsynth::synthesis::{FeatureDescriptor, FeatureMatrix};

// =============================================================================
// Test Strategies
// =============================================================================

/// A cell: mostly numbers, sometimes missing or non-finite.
fn cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        6 => (-1000i64..1000).prop_map(Value::Int),
        6 => (-1.0e6f64..1.0e6).prop_map(Value::Float),
        2 => Just(Value::Null),
        1 => Just(Value::Float(f64::NAN)),
        1 => any::<bool>().prop_map(Value::Bool),
        1 => "[a-z]{1,4}".prop_map(Value::Text),
    ]
}

/// A matrix with 0..8 columns and 0..20 rows, plus one descriptor per column.
fn matrix() -> impl Strategy<Value = (FeatureMatrix, Vec<FeatureDescriptor>)> {
    (0usize..20, 0usize..8).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(prop::collection::vec(cell(), rows), cols).prop_map(
            move |columns| {
                let index = (0..rows as i64).map(Value::Int).collect();
                let mut matrix = FeatureMatrix::new("id", index);
                let mut descriptors = Vec::new();
                for (i, values) in columns.into_iter().enumerate() {
                    let name = format!("f{}", i);
                    descriptors.push(FeatureDescriptor::identity(
                        "t",
                        &name,
                        VariableType::Numeric,
                    ));
                    matrix = matrix.with_column(name, values);
                }
                (matrix, descriptors)
            },
        )
    })
}

fn is_subsequence(sub: &[&str], full: &[&str]) -> bool {
    let mut rest = full.iter();
    sub.iter().all(|s| rest.any(|f| f == s))
}

// =============================================================================
// Null Filter
// =============================================================================

proptest! {
    #[test]
    fn null_filter_is_idempotent((m, d) in matrix(), threshold in 0.0f64..=1.0) {
        let (once_m, once_d) = drop_percent_null(&m, &d, threshold).unwrap();
        let (twice_m, twice_d) = drop_percent_null(&once_m, &once_d, threshold).unwrap();
        prop_assert_eq!(once_m.column_names(), twice_m.column_names());
        prop_assert_eq!(once_d, twice_d);
    }

    #[test]
    fn null_filter_respects_threshold((m, d) in matrix(), threshold in 0.0f64..=1.0) {
        let (pruned, kept) = drop_percent_null(&m, &d, threshold).unwrap();
        prop_assert_eq!(pruned.n_columns(), kept.len());
        for column in pruned.columns() {
            prop_assert!(column.missing_fraction() <= threshold);
        }
    }
}

// =============================================================================
// Correlation Filter
// =============================================================================

proptest! {
    #[test]
    fn correlation_filter_returns_ordered_subset((m, d) in matrix(), threshold in 0.0f64..=1.0) {
        let (pruned, kept) = select_one_of_correlated(&m, &d, threshold).unwrap();
        prop_assert!(pruned.n_columns() <= m.n_columns());
        prop_assert_eq!(pruned.n_columns(), kept.len());
        prop_assert!(is_subsequence(&pruned.column_names(), &m.column_names()));
        for (column, descriptor) in pruned.columns().iter().zip(&kept) {
            prop_assert_eq!(&column.name, &descriptor.name);
        }
    }

    #[test]
    fn correlation_threshold_one_keeps_all((m, d) in matrix()) {
        let (pruned, _) = select_one_of_correlated(&m, &d, 1.0).unwrap();
        prop_assert_eq!(pruned.n_columns(), m.n_columns());
    }
}

// =============================================================================
// Full Pipeline
// =============================================================================

proptest! {
    #[test]
    fn pruning_is_deterministic(
        (m, d) in matrix(),
        null in 0.0f64..=1.0,
        corr in 0.0f64..=1.0,
    ) {
        let pruner = Pruner::with_config(PruneConfig {
            max_percent_null: null,
            max_correlation: corr,
        });
        let (first_m, first_d) = pruner.prune(&m, &d).unwrap();
        let (second_m, second_d) = pruner.prune(&m, &d).unwrap();
        prop_assert_eq!(first_m.column_names(), second_m.column_names());
        prop_assert_eq!(
            serde_json::to_string(&first_d).unwrap(),
            serde_json::to_string(&second_d).unwrap()
        );
    }
}

// =============================================================================
// Fit / Produce Row Order
// =============================================================================

mod row_order {
    use super::*;
    use relsynth::dataset::{Dataset, Table};
    use relsynth::input::DataTable;
    use relsynth::primitive::{CallOptions, Fit, Hyperparams, MultiTableFeaturizer, Produce};
    use relsynth::schema::{ColumnMeta, DeclaredType};

    fn dataset(customer_ids: &[u32], orders: &[(u32, u32)]) -> Dataset {
        let customers = Table::new(
            "customers",
            vec![ColumnMeta::primary_key("customer_id")],
            DataTable::new(
                vec!["customer_id".into(), "score".into()],
                customer_ids
                    .iter()
                    .map(|id| vec![id.to_string(), (id * 3 % 7).to_string()])
                    .collect(),
            ),
        );
        let orders = Table::new(
            "orders",
            vec![
                ColumnMeta::primary_key("order_id"),
                ColumnMeta::new("customer_id").references("customers", "customer_id"),
                ColumnMeta::new("amount").with_type(DeclaredType::Real),
            ],
            DataTable::new(
                vec!["order_id".into(), "customer_id".into(), "amount".into()],
                orders
                    .iter()
                    .enumerate()
                    .map(|(i, (customer, amount))| {
                        vec![i.to_string(), customer.to_string(), amount.to_string()]
                    })
                    .collect(),
            ),
        );
        Dataset::new("shop")
            .with_entry_point("customers")
            .with_table(customers)
            .with_table(orders)
    }

    proptest! {
        #[test]
        fn produce_keeps_input_row_order(
            ids in Just((0u32..12).collect::<Vec<_>>()).prop_shuffle(),
            orders in prop::collection::vec((0u32..12, 1u32..100), 0..30),
        ) {
            let train: Vec<u32> = (0..12).collect();
            let mut featurizer = MultiTableFeaturizer::new(Hyperparams::default()).unwrap();
            featurizer.fit(&dataset(&train, &orders), CallOptions::default()).unwrap();

            let output = featurizer
                .produce(&dataset(&ids, &orders), CallOptions::default())
                .unwrap()
                .value;
            let expected: Vec<Value> = ids.iter().map(|id| Value::Int(*id as i64)).collect();
            prop_assert_eq!(&output.column("customer_id").unwrap().values, &expected);
        }
    }
}
