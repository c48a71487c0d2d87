//! Property tests over arbitrary scales and columns.

use dpshield::adapters::StatisticalNoise;
use dpshield::domain::{Column, ColumnKind, NumericCell, Value};
use dpshield::ports::NoiseSource;
use dpshield::{privatize_column, run_query, QueryValue};
use proptest::prelude::*;

/// Cells of a numeric column: finite numbers, missing cells and invalid ones.
fn numeric_cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        6 => (-1e6f64..1e6).prop_map(Value::Number),
        1 => Just(Value::Missing),
        1 => Just(Value::Number(f64::NAN)),
        1 => Just(Value::Number(f64::INFINITY)),
        1 => "[a-z]{1,4}".prop_map(Value::Category),
    ]
}

fn categorical_cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => "[a-d]".prop_map(Value::Category),
        1 => Just(Value::Missing),
    ]
}

fn numeric_column() -> impl Strategy<Value = Column> {
    prop::collection::vec(numeric_cell(), 0..60).prop_map(|values| Column::with_kind("x", values, ColumnKind::Numeric))
}

fn categorical_column() -> impl Strategy<Value = Column> {
    prop::collection::vec(categorical_cell(), 0..60).prop_map(|values| Column::new("c", values))
}

fn finite_cells(column: &Column) -> usize {
    column
        .values()
        .iter()
        .filter(|v| matches!(v.to_numeric(), NumericCell::Finite(_)))
        .count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_noise_finite_for_any_scale(scale in 1e-9f64..1e9, seed in any::<u64>()) {
        let noise = StatisticalNoise::from_seed_u64(seed);
        prop_assert!(noise.laplace(scale).expect("laplace draw").is_finite());
        prop_assert!(noise.gaussian(scale).expect("gaussian draw").is_finite());
    }

    #[test]
    fn prop_numeric_release_keeps_shape(
        column in numeric_column(),
        epsilon in 0.0f64..10.0,
        mechanism in prop_oneof!["laplace", "gaussian", "exponential"],
        seed in any::<u64>()
    ) {
        let noise = StatisticalNoise::from_seed_u64(seed);
        let out = privatize_column(&column, &mechanism, epsilon, 1e-5, &noise).expect("Should privatize");

        prop_assert_eq!(out.len(), column.len());
        for (before, after) in column.values().iter().zip(out.values()) {
            prop_assert_eq!(before.is_missing(), after.is_missing());
            match before.to_numeric() {
                NumericCell::Finite(_) => {
                    prop_assert!(matches!(after, Value::Number(x) if x.is_finite()));
                }
                NumericCell::Invalid => prop_assert_eq!(before, after),
                NumericCell::Missing => {}
            }
        }
    }

    #[test]
    fn prop_categorical_release_keeps_shape(column in categorical_column(), seed in any::<u64>()) {
        let noise = StatisticalNoise::from_seed_u64(seed);
        let out = privatize_column(&column, "exponential", 1.0, 1e-5, &noise).expect("Should privatize");
        let observed = column.categories();

        prop_assert_eq!(out.len(), column.len());
        for (before, after) in column.values().iter().zip(out.values()) {
            prop_assert_eq!(before.is_missing(), after.is_missing());
            if !after.is_missing() {
                prop_assert!(observed.contains(after));
            }
        }
    }

    #[test]
    fn prop_count_is_exact(column in numeric_column(), seed in any::<u64>()) {
        let noise = StatisticalNoise::from_seed_u64(seed);
        let expected = finite_cells(&column) as f64;

        let count = run_query(&column, "count", "laplace", 1.0, 1e-5, &noise).expect("count");
        prop_assert_eq!(count.true_value, QueryValue::Scalar(expected));

        let series = run_query(&column, "full_column", "laplace", 1.0, 1e-5, &noise).expect("full_column");
        prop_assert_eq!(series.true_value.as_series().map(<[f64]>::len), Some(expected as usize));
    }

    #[test]
    fn prop_histogram_keys_and_total(column in categorical_column(), seed in any::<u64>()) {
        let noise = StatisticalNoise::from_seed_u64(seed);
        let result = run_query(&column, "histogram", "laplace", 1.0, 1e-5, &noise).expect("histogram");
        let truth = result.true_value.as_histogram().expect("histogram");
        let noised = result.noised_value.as_histogram().expect("histogram");

        prop_assert_eq!(truth.keys().collect::<Vec<_>>(), noised.keys().collect::<Vec<_>>());
        prop_assert_eq!(truth.values().sum::<f64>(), column.non_missing_count() as f64);
    }
}
