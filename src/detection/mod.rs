//! Detection engine module
//!
//! Runs the whole batch in one call:
//! - Feature preparation (numeric selection, imputation, constant-column removal, scaling)
//! - Isolation forest training with the configured seed and worker count
//! - In-sample scoring and labelling, joined back to the raw table
//! - Per-stage timings and structured logging
//!
//! The fitted parameters stay on [`DetectionOutcome`] so later tables with
//! the same schema can be scored without retraining.

mod config;
mod engine;

pub use config::DetectionConfig;
pub use engine::{DetectionEngine, DetectionOutcome, StageTimings};
