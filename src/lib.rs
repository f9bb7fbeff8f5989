//! KPI Sentinel - Unsupervised anomaly detection for 5G KPI telemetry
//!
//! This crate turns a table of per-cell KPI records into anomaly scores and labels:
//! - Feature preparation: numeric selection, median imputation, constant column removal, standardization
//! - Isolation forest training with seeded, reproducible parallel tree construction
//! - Contamination-driven decision boundary with deterministic tie handling
//! - Reporting views and CSV export over the scored records
//!
//! # Modules
//!
//! ## Core
//! - [`preprocessing`] - Raw table to standardized feature matrix
//! - [`anomaly`] - Isolation forest, scoring and labelling
//! - [`report`] - Totals, sorted anomalies, per-label feature breakdowns, export tables
//! - [`detection`] - One-call prepare → train → score engine
//!
//! ## Infrastructure
//! - [`utils`] - Data loading and saving, thread pools, descriptive statistics
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use kpi_sentinel::prelude::*;
//!
//! let outcome = DetectionEngine::new(DetectionConfig::default()).run_file("kpis.csv")?;
//! for sample in outcome.report.filter(&AnomalyFilter::new().with_limit(5)) {
//!     println!("row {} score {:.4}", sample.index, sample.score);
//! }
//! # Ok::<(), kpi_sentinel::SentinelError>(())
//! ```

// Core error handling
pub mod error;

// Core modules
pub mod preprocessing;
pub mod anomaly;
pub mod report;
pub mod detection;

// Infrastructure
pub mod utils;

// Services
pub mod cli;

pub use error::{Result, SentinelError};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{Result, SentinelError};

    // Preprocessing
    pub use crate::preprocessing::{FeaturePreparer, PreparedData, PreprocessingConfig, ScalingParams};

    // Anomaly detection
    pub use crate::anomaly::{AnomalyDetector, ForestConfig, IsolationForest, Label, MaxSamples, ScoredSample};

    // Reporting
    pub use crate::report::{AnomalyFilter, AnomalyReport, RiskLevel};

    // Engine
    pub use crate::detection::{DetectionConfig, DetectionEngine, DetectionOutcome};

    // Data I/O
    pub use crate::utils::{DataLoader, DataSaver};
}
