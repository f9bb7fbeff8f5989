//! Parallel processing utilities

use crate::error::{Result, SentinelError};
use serde::{Deserialize, Serialize};

/// Configuration for parallel processing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Number of threads (None = use the global rayon pool)
    pub n_threads: Option<usize>,
}

impl ParallelConfig {
    /// Create a new parallel configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an optional `n_jobs` setting
    pub fn from_n_jobs(n_jobs: Option<usize>) -> Self {
        Self { n_threads: n_jobs }
    }

    /// Set number of threads
    pub fn with_threads(mut self, n: usize) -> Self {
        self.n_threads = Some(n);
        self
    }

    /// Get the number of threads to use
    pub fn num_threads(&self) -> usize {
        self.n_threads.unwrap_or_else(rayon::current_num_threads)
    }

    /// Run `op` inside a dedicated pool of `n_threads` workers, or directly
    /// (on the global pool) when no thread count is set.
    pub fn install<R, F>(&self, op: F) -> Result<R>
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match self.n_threads {
            None => Ok(op()),
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SentinelError::ThreadPoolError(e.to_string()))?;
                Ok(pool.install(op))
            }
        }
    }
}
