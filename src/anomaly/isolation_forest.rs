//! Isolation Forest anomaly detection

use crate::anomaly::config::ForestConfig;
use crate::anomaly::scorer::{DecisionThreshold, ScoredSample};
use crate::anomaly::tree::{average_path_length, max_depth_for, IsolationTree};
use crate::anomaly::AnomalyDetector;
use crate::error::{Result, SentinelError};
use crate::utils::ParallelConfig;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Trained isolation forest.
///
/// Immutable once [`IsolationForest::fit`] returns; safe to share across
/// threads for concurrent scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationForest {
    /// Configuration used for training
    config: ForestConfig,
    /// Fitted trees, in seed order
    trees: Vec<IsolationTree>,
    /// Resolved rows per tree
    max_samples: usize,
    /// Column count of the training matrix
    n_features: usize,
    /// Boundary fitted on the training scores
    threshold: DecisionThreshold,
}

impl IsolationForest {
    /// Train a forest on a standardized feature matrix.
    ///
    /// Tree `i` draws from its own ChaCha8 stream seeded with
    /// `random_state + i`, so the result does not depend on how many threads
    /// build the trees or in which order they finish.
    pub fn fit(x: &Array2<f64>, config: &ForestConfig) -> Result<Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_features == 0 {
            return Err(SentinelError::Schema(
                "feature matrix has no columns".to_string(),
            ));
        }

        let max_samples = config.resolve_max_samples(n_samples)?;

        // Split draws need a finite `max - min` in every column
        for (j, column) in x.columns().into_iter().enumerate() {
            let (lo, hi) = column
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
            if column.iter().any(|v| !v.is_finite()) || !(hi - lo).is_finite() {
                return Err(SentinelError::DataError(format!(
                    "feature column {} has non-finite values or range [{}, {}]",
                    j, lo, hi
                )));
            }
        }

        let max_depth = max_depth_for(max_samples);
        let base_seed = config.random_state;

        let start = Instant::now();
        let trees: Vec<IsolationTree> = ParallelConfig::from_n_jobs(config.n_jobs).install(|| {
            (0..config.n_estimators)
                .into_par_iter()
                .map(|tree_idx| {
                    let seed = base_seed.wrapping_add(tree_idx as u64);
                    let mut rng = ChaCha8Rng::seed_from_u64(seed);

                    // Subsample without replacement, then grow
                    let indices =
                        rand::seq::index::sample(&mut rng, n_samples, max_samples).into_vec();
                    IsolationTree::build(x, &indices, 0, max_depth, &mut rng)
                })
                .collect()
        })?;

        debug!(
            n_trees = trees.len(),
            max_samples,
            max_depth,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built isolation trees"
        );

        let mut forest = Self {
            config: config.clone(),
            trees,
            max_samples,
            n_features,
            threshold: DecisionThreshold::default(),
        };

        let normality: Vec<f64> = forest.score_samples(x)?.iter().map(|s| -s).collect();
        forest.threshold = DecisionThreshold::fit(&normality, config.contamination);

        info!(
            n_samples,
            n_features,
            n_trees = forest.trees.len(),
            offset = forest.threshold.offset,
            n_anomalies = forest.threshold.n_anomalies,
            "Trained isolation forest"
        );

        Ok(forest)
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn trees(&self) -> &[IsolationTree] {
        &self.trees
    }

    /// Rows drawn per tree after resolving `MaxSamples::Auto`
    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    pub fn decision_threshold(&self) -> &DecisionThreshold {
        &self.threshold
    }

    fn check_features(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.n_features {
            return Err(SentinelError::SchemaMismatch {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(())
    }

    /// Mean path length of one sample over all trees, summed in tree order
    fn mean_path_length(&self, sample: ndarray::ArrayView1<f64>) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.path_length(sample)).sum();
        total / self.trees.len() as f64
    }
}

impl AnomalyDetector for IsolationForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    /// Isolation score s(x, n) = 2^(-E[h(x)] / c(n)), in (0, 1].
    /// Higher means more anomalous.
    fn score_samples(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.check_features(x)?;

        let c_n = average_path_length(self.max_samples);

        let scores: Vec<f64> = ParallelConfig::from_n_jobs(self.config.n_jobs).install(|| {
            (0..x.nrows())
                .into_par_iter()
                .map(|i| {
                    let avg_path_length = self.mean_path_length(x.row(i));
                    2.0_f64.powf(-avg_path_length / c_n)
                })
                .collect()
        })?;

        Ok(Array1::from_vec(scores))
    }

    fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let scores = self.score_samples(x)?;
        Ok(scores.mapv(|s| -s - self.threshold.offset))
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<ScoredSample>> {
        let decision = self.decision_function(x)?.to_vec();
        let labels = self.threshold.label(&decision);

        Ok(decision
            .into_iter()
            .zip(labels)
            .enumerate()
            .map(|(index, (score, label))| ScoredSample {
                index,
                score,
                label,
            })
            .collect())
    }
}
