//! Integration test: Isolation forest training, scoring and labelling

use kpi_sentinel::anomaly::{self, AnomalyDetector, ForestConfig, IsolationForest, Label};
use kpi_sentinel::error::SentinelError;
use kpi_sentinel::preprocessing::{prepare, FeaturePreparer, PreprocessingConfig, ScalerType};
use ndarray::{array, Array2};
use polars::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn uniform_matrix(n_rows: usize, n_cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Array2::from_shape_fn((n_rows, n_cols), |_| rng.gen_range(-1.0..1.0))
}

fn anomalous_count(forest: &IsolationForest, x: &Array2<f64>) -> usize {
    forest
        .predict(x)
        .unwrap()
        .iter()
        .filter(|s| s.label.is_anomalous())
        .count()
}

#[test]
fn test_same_seed_is_deterministic_across_thread_counts() {
    let x = uniform_matrix(400, 4, 1);
    let config = ForestConfig::new().with_n_estimators(64).with_random_state(11);

    let single = anomaly::train(&x, &config.clone().with_n_jobs(1)).unwrap();
    let many = anomaly::train(&x, &config.clone().with_n_jobs(4)).unwrap();
    let global = anomaly::train(&x, &config).unwrap();

    assert_eq!(single.trees(), many.trees());
    assert_eq!(single.trees(), global.trees());

    let a = single.score_samples(&x).unwrap();
    let b = many.score_samples(&x).unwrap();
    let bits_a: Vec<u64> = a.iter().map(|v| v.to_bits()).collect();
    let bits_b: Vec<u64> = b.iter().map(|v| v.to_bits()).collect();
    assert_eq!(bits_a, bits_b);
    assert_eq!(single.decision_threshold(), many.decision_threshold());
}

#[test]
fn test_different_seed_changes_trees() {
    let x = uniform_matrix(200, 3, 2);
    let a = anomaly::train(&x, &ForestConfig::new().with_n_estimators(10).with_random_state(1)).unwrap();
    let b = anomaly::train(&x, &ForestConfig::new().with_n_estimators(10).with_random_state(2)).unwrap();
    assert_ne!(a.trees(), b.trees());
}

#[test]
fn test_scoring_is_idempotent() {
    let x = uniform_matrix(150, 3, 3);
    let forest = anomaly::train(&x, &ForestConfig::new().with_n_estimators(50)).unwrap();

    let first = anomaly::score(&forest, &x).unwrap();
    let second = anomaly::score(&forest, &x).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_anomaly_count_matches_contamination() {
    let x = uniform_matrix(300, 5, 4);
    for contamination in [0.01, 0.05, 0.1, 0.25] {
        let forest = anomaly::train(
            &x,
            &ForestConfig::new().with_n_estimators(80).with_contamination(contamination),
        )
        .unwrap();
        let expected = (contamination * 300.0).round() as i64;
        let actual = anomalous_count(&forest, &x) as i64;
        assert!(
            (actual - expected).abs() <= 1,
            "contamination {}: expected {}, got {}",
            contamination,
            expected,
            actual
        );
    }
}

#[test]
fn test_scores_and_labels_agree() {
    let x = uniform_matrix(200, 3, 5);
    let forest = anomaly::train(&x, &ForestConfig::new().with_n_estimators(60)).unwrap();

    let raw = forest.score_samples(&x).unwrap();
    assert!(raw.iter().all(|&s| s > 0.0 && s <= 1.0));

    let decision = forest.decision_function(&x).unwrap();
    for (sample, d) in forest.predict(&x).unwrap().iter().zip(decision.iter()) {
        assert_eq!(sample.score, *d);
        if *d < 0.0 {
            assert_eq!(sample.label, Label::Anomalous);
        } else if *d > 0.0 {
            assert_eq!(sample.label, Label::Normal);
        }
    }
}

#[test]
fn test_outlier_scores_below_center() {
    let mut x = uniform_matrix(256, 3, 6);
    x.row_mut(0).fill(0.0);
    x.row_mut(1).fill(25.0);

    let forest = anomaly::train(&x, &ForestConfig::new().with_n_estimators(100)).unwrap();
    let decision = forest.decision_function(&x).unwrap();
    assert!(decision[1] < decision[0]);

    let samples = forest.predict(&x).unwrap();
    assert_eq!(samples[1].label, Label::Anomalous);
}

#[test]
fn test_new_data_scored_against_training_boundary() {
    let x = uniform_matrix(300, 2, 7);
    let forest = anomaly::train(&x, &ForestConfig::new().with_n_estimators(100)).unwrap();

    let fresh = array![[0.0, 0.0], [40.0, -40.0]];
    let samples = anomaly::score(&forest, &fresh).unwrap();
    assert_eq!(samples[0].label, Label::Normal);
    assert_eq!(samples[1].label, Label::Anomalous);
    assert!(samples[1].score < samples[0].score);
}

#[test]
fn test_single_spike_column_is_kept_and_flagged() {
    let mut values = vec![3.0; 20];
    values[7] = 30.0;
    let df = df!("dl_throughput" => &values).unwrap();

    let prepared = prepare(df).unwrap();
    assert_eq!(prepared.feature_names(), vec!["dl_throughput"]);

    let forest = anomaly::train(&prepared.matrix, &ForestConfig::new()).unwrap();
    let samples = anomaly::score(&forest, &prepared.matrix).unwrap();
    let flagged: Vec<usize> = samples
        .iter()
        .filter(|s| s.label.is_anomalous())
        .map(|s| s.index)
        .collect();
    assert_eq!(flagged, vec![7]);
}

#[test]
fn test_tied_duplicates_break_by_row_order() {
    let mut x = uniform_matrix(40, 2, 8);
    for row in [5, 20, 33] {
        x.row_mut(row).fill(50.0);
    }

    // round(0.05 * 40) = 2 of the 3 identical outliers
    let forest = anomaly::train(&x, &ForestConfig::new().with_n_estimators(100)).unwrap();
    let samples = forest.predict(&x).unwrap();

    assert_eq!(samples[5].score, 0.0);
    assert_eq!(samples[20].score, 0.0);
    assert_eq!(samples[33].score, 0.0);
    assert_eq!(samples[5].label, Label::Normal);
    assert_eq!(samples[20].label, Label::Anomalous);
    assert_eq!(samples[33].label, Label::Anomalous);
    assert_eq!(forest.decision_threshold().tie_quota, 2);
    assert_eq!(anomalous_count(&forest, &x), 2);
}

#[test]
fn test_invalid_configs_are_rejected() {
    let x = uniform_matrix(50, 2, 9);
    let cases = [
        ForestConfig::new().with_n_estimators(0),
        ForestConfig::new().with_contamination(0.0),
        ForestConfig::new().with_contamination(0.5),
        ForestConfig::new().with_contamination(f64::NAN),
        ForestConfig::new().with_max_samples(51),
        ForestConfig::new().with_max_samples(1),
    ];
    for config in cases {
        assert!(
            matches!(anomaly::train(&x, &config), Err(SentinelError::InvalidConfig { .. })),
            "expected InvalidConfig for {:?}",
            config
        );
    }
}

#[test]
fn test_single_row_matrix_is_rejected() {
    let x = array![[1.0, 2.0]];
    assert!(matches!(
        anomaly::train(&x, &ForestConfig::new()),
        Err(SentinelError::InvalidConfig { .. })
    ));
}

#[test]
fn test_matrix_without_columns_is_schema_error() {
    let x = Array2::<f64>::zeros((10, 0));
    assert!(matches!(
        anomaly::train(&x, &ForestConfig::new()),
        Err(SentinelError::Schema(_))
    ));
}

#[test]
fn test_scoring_wrong_width_is_schema_mismatch() {
    let x = uniform_matrix(60, 3, 10);
    let forest = anomaly::train(&x, &ForestConfig::new().with_n_estimators(20)).unwrap();
    let narrow = uniform_matrix(5, 2, 11);
    assert!(matches!(
        anomaly::score(&forest, &narrow),
        Err(SentinelError::SchemaMismatch { .. })
    ));
}

#[test]
fn test_unscaled_extreme_range_is_data_error() {
    let df = df!(
        "a" => &[-1e308, 1e308, 0.0, 5.0],
        "b" => &[1.0, 2.0, 3.0, 4.0]
    )
    .unwrap();
    let preparer =
        FeaturePreparer::with_config(PreprocessingConfig::new().with_scaler(ScalerType::None));
    let prepared = preparer.prepare(df).unwrap();

    assert!(matches!(
        anomaly::train(&prepared.matrix, &ForestConfig::new().with_n_estimators(10)),
        Err(SentinelError::DataError(_))
    ));
}

#[test]
fn test_non_finite_matrix_is_data_error() {
    let mut x = uniform_matrix(20, 2, 12);
    x[[4, 1]] = f64::INFINITY;
    assert!(matches!(
        anomaly::train(&x, &ForestConfig::new()),
        Err(SentinelError::DataError(_))
    ));
}
