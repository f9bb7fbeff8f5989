//! Isolation forest configuration

use crate::error::{Result, SentinelError};
use serde::{Deserialize, Serialize};

/// Upper bound on the per-tree subsample when `max_samples` is `Auto`
pub const AUTO_MAX_SAMPLES: usize = 256;

/// Number of rows drawn for each tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxSamples {
    /// min(256, n_samples)
    Auto,
    /// Exact subsample size; must not exceed the number of rows
    Count(usize),
}

impl Default for MaxSamples {
    fn default() -> Self {
        MaxSamples::Auto
    }
}

/// Configuration for training an isolation forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees
    pub n_estimators: usize,
    /// Rows drawn (without replacement) per tree
    pub max_samples: MaxSamples,
    /// Expected fraction of anomalies, in (0, 0.5)
    pub contamination: f64,
    /// Base seed; tree `i` uses `random_state + i`
    pub random_state: u64,
    /// Worker threads (None = rayon global pool)
    pub n_jobs: Option<usize>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            max_samples: MaxSamples::Auto,
            contamination: 0.05,
            random_state: 42,
            n_jobs: None,
        }
    }
}

impl ForestConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of trees
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    /// Set an explicit per-tree subsample size
    pub fn with_max_samples(mut self, n: usize) -> Self {
        self.max_samples = MaxSamples::Count(n);
        self
    }

    /// Set contamination ratio
    pub fn with_contamination(mut self, c: f64) -> Self {
        self.contamination = c;
        self
    }

    /// Set random seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Set number of worker threads
    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = Some(n_jobs);
        self
    }

    /// Check the hyperparameters that do not depend on the data
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators < 1 {
            return Err(SentinelError::invalid_config(
                "n_estimators",
                self.n_estimators,
                "at least one tree is required",
            ));
        }
        if !(self.contamination > 0.0 && self.contamination < 0.5) {
            return Err(SentinelError::invalid_config(
                "contamination",
                self.contamination,
                "must be in (0, 0.5)",
            ));
        }
        if let MaxSamples::Count(n) = self.max_samples {
            if n < 1 {
                return Err(SentinelError::invalid_config(
                    "max_samples",
                    n,
                    "must be a positive integer",
                ));
            }
        }
        if self.n_jobs == Some(0) {
            return Err(SentinelError::invalid_config(
                "n_jobs",
                0,
                "must be a positive integer",
            ));
        }
        Ok(())
    }

    /// Validate against a matrix of `n_samples` rows and resolve the subsample size
    pub fn resolve_max_samples(&self, n_samples: usize) -> Result<usize> {
        self.validate()?;

        let max_samples = match self.max_samples {
            MaxSamples::Auto => AUTO_MAX_SAMPLES.min(n_samples),
            MaxSamples::Count(n) => {
                if n > n_samples {
                    return Err(SentinelError::invalid_config(
                        "max_samples",
                        n,
                        format!("exceeds the number of samples ({})", n_samples),
                    ));
                }
                n
            }
        };

        // c(1) = 0 would make the score normalizer divide by zero
        if max_samples < 2 {
            return Err(SentinelError::invalid_config(
                "max_samples",
                max_samples,
                "at least two samples per tree are required",
            ));
        }

        Ok(max_samples)
    }
}
