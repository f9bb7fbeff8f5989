//! Anomaly detection
//!
//! An isolation forest built from scratch:
//! - [`IsolationForest::fit`] grows randomized partitioning trees on a standardized matrix
//! - [`AnomalyDetector`] turns path lengths into scores and labels
//! - [`DecisionThreshold`] holds the contamination-driven boundary and its tie-break rule
//!
//! Score conventions: [`AnomalyDetector::score_samples`] returns the raw isolation
//! score (higher = more anomalous). Everything reported downstream uses
//! [`AnomalyDetector::decision_function`], where lower = more anomalous and
//! the boundary is zero.

mod config;
mod isolation_forest;
mod scorer;
mod tree;

pub use config::{ForestConfig, MaxSamples, AUTO_MAX_SAMPLES};
pub use isolation_forest::IsolationForest;
pub use scorer::{DecisionThreshold, Label, ScoredSample};
pub use tree::{average_path_length, max_depth_for, IsolationTree, EULER_GAMMA};

use crate::error::Result;
use ndarray::{Array1, Array2};

/// A trained detector that scores and labels feature matrices
pub trait AnomalyDetector: Send + Sync {
    /// Column count the detector was trained on
    fn n_features(&self) -> usize;

    /// Raw anomaly score per sample; higher = more anomalous
    fn score_samples(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Normality score shifted so the decision boundary is zero; lower = more anomalous
    fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Decision value and label per sample
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<ScoredSample>>;
}

/// Train an isolation forest on a standardized matrix
pub fn train(x: &Array2<f64>, config: &ForestConfig) -> Result<IsolationForest> {
    IsolationForest::fit(x, config)
}

/// Score and label every row of `x`
pub fn score(detector: &impl AnomalyDetector, x: &Array2<f64>) -> Result<Vec<ScoredSample>> {
    detector.predict(x)
}
