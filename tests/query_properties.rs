//! End-to-end behaviour of the public surface.

use std::sync::Arc;
use std::thread;

use dpshield::adapters::{SecureNoise, StatisticalNoise};
use dpshield::application::{dp_count_with, dp_sum_with, QueryRequest};
use dpshield::domain::{Column, Dataset, QueryValue, Value};
use dpshield::{privatize_column, run_dataset_query, run_query, DpShieldError};

const SAMPLE_DATA: [f64; 7] = [5.0, 7.0, 3.0, 9.0, 2.0, 10.0, 4.0];

fn compute_mean(samples: &[f64]) -> f64 {
    samples.iter().sum::<f64>() / samples.len() as f64
}

#[test]
fn test_dp_count_of_empty_averages_zero() {
    let noise = SecureNoise::from_seed_u64(201);
    let samples: Vec<f64> = (0..4000)
        .map(|_| dp_count_with(Vec::<f64>::new(), 1.0, &noise).expect("dp_count"))
        .collect();

    // Laplace(0, 1): SE of the mean is sqrt(2 / n)
    let mean = compute_mean(&samples);
    assert!(mean.abs() < 5.0 * (2.0f64 / 4000.0).sqrt(), "mean {mean}");
}

#[test]
fn test_dp_sum_averages_true_sum() {
    let noise = SecureNoise::from_seed_u64(202);
    let samples: Vec<f64> = (0..4000)
        .map(|_| dp_sum_with(SAMPLE_DATA, 1.0, 10.0, &noise).expect("dp_sum"))
        .collect();

    // Laplace(0, 10): SE of the mean is sqrt(200 / n)
    let mean = compute_mean(&samples);
    assert!((mean - 40.0).abs() < 5.0 * (200.0f64 / 4000.0).sqrt(), "mean {mean}");
}

#[test]
fn test_public_scalar_functions() {
    assert!(dpshield::laplace_noise(1.0).expect("laplace").is_finite());
    assert!(dpshield::dp_count(["a", "b"], 1.0).expect("count").is_finite());
    assert!(dpshield::dp_sum(SAMPLE_DATA, 1.0, dpshield::DEFAULT_SUM_SENSITIVITY)
        .expect("sum")
        .is_finite());
}

#[test]
fn test_privatize_column_keeps_shape() {
    let noise = StatisticalNoise::from_seed_u64(203);

    let numeric = Column::numeric("bmi", [Some(22.5), None, Some(31.0), Some(f64::NAN), Some(27.1)]);
    let out = privatize_column(&numeric, "laplace", 1.0, 1e-5, &noise).expect("numeric");
    assert_eq!(out.len(), numeric.len());
    for (before, after) in numeric.values().iter().zip(out.values()) {
        assert_eq!(before.is_missing(), after.is_missing());
    }

    let categorical = Column::categorical("blood", [Some("A"), None, Some("O"), Some("B"), Some("O")]);
    let out = privatize_column(&categorical, "exponential", 1.0, 1e-5, &noise).expect("categorical");
    let observed = categorical.categories();
    assert_eq!(out.len(), categorical.len());
    assert_eq!(out.values()[1], Value::Missing);
    for value in out.values().iter().filter(|v| !v.is_missing()) {
        assert!(observed.contains(value), "{value:?} was not in the input");
    }
}

#[test]
fn test_count_true_value_is_exact() {
    let noise = SecureNoise::from_seed_u64(204);
    let column = Column::numeric("x", (0..100).map(|i| Some(f64::from(i))));

    let result = run_query(&column, "count", "laplace", 1.0, 1e-5, &noise).expect("count");
    assert_eq!(result.true_value, QueryValue::Scalar(100.0));
    assert!(result.noised_value.as_scalar().is_some_and(f64::is_finite));
}

#[test]
fn test_unknown_operation_is_validation_error() {
    let noise = SecureNoise::from_seed_u64(205);
    let column = Column::numeric("x", [Some(1.0)]);

    let err = run_query(&column, "median", "laplace", 1.0, 1e-5, &noise).expect_err("median is unsupported");
    assert!(err.is_validation());
    assert!(matches!(err, DpShieldError::Validation(_)));
}

#[test]
fn test_categorical_histogram_keys_match() {
    let noise = SecureNoise::from_seed_u64(206);
    let column = Column::categorical("city", [Some("Lyon"), Some("Graz"), None, Some("Lyon"), Some("Oslo")]);

    let result = run_query(&column, "histogram", "gaussian", 1.0, 1e-5, &noise).expect("histogram");
    let truth = result.true_value.as_histogram().expect("histogram");
    let noised = result.noised_value.as_histogram().expect("histogram");

    assert_eq!(truth.keys().collect::<Vec<_>>(), vec!["Graz", "Lyon", "Oslo"]);
    assert_eq!(truth.keys().collect::<Vec<_>>(), noised.keys().collect::<Vec<_>>());
    assert_eq!(truth.get("Lyon"), Some(&2.0));
}

#[test]
fn test_zero_epsilon_is_finite() {
    let noise = SecureNoise::from_seed_u64(207);
    let column = Column::numeric("x", SAMPLE_DATA.map(Some));

    for mechanism in ["laplace", "gaussian", "exponential"] {
        let result = run_query(&column, "sum", mechanism, 0.0, 0.0, &noise).expect("sum");
        assert!(result.noised_value.as_scalar().is_some_and(f64::is_finite));
    }

    let out = privatize_column(&column, "gaussian", 0.0, 0.0, &noise).expect("column");
    assert!(out.numeric_values().iter().all(|x| x.is_finite()));
}

#[test]
fn test_dataset_query_missing_column() {
    let noise = SecureNoise::from_seed_u64(208);
    let dataset = Dataset::from_json_str(r#"{"age": [30, 40], "city": ["Lyon", null]}"#).expect("dataset");

    let ok = run_dataset_query(&dataset, "age", &QueryRequest::new("mean", "laplace"), &noise).expect("mean");
    assert_eq!(ok.true_value, QueryValue::Scalar(35.0));

    let err = run_dataset_query(&dataset, "weight", &QueryRequest::new("mean", "laplace"), &noise)
        .expect_err("weight does not exist");
    assert!(err.is_validation());
}

#[test]
fn test_shared_source_across_threads() {
    let noise = Arc::new(SecureNoise::new());
    let column = Arc::new(Column::numeric("x", (0..50).map(|i| Some(f64::from(i)))));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let noise = Arc::clone(&noise);
            let column = Arc::clone(&column);
            thread::spawn(move || privatize_column(&column, "laplace", 1.0, 1e-5, &*noise).map(|c| c.len()))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("thread panicked").expect("privatize"), 50);
    }
}
