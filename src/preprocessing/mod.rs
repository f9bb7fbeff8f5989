//! Feature preparation
//!
//! Turns a raw KPI table into the numeric matrix the detector consumes:
//! - Numeric column selection (non-numeric fields are excluded, never coerced)
//! - Median imputation of missing values
//! - Constant column removal
//! - Standardization with parameters reusable at inference time

mod config;
mod imputer;
mod pipeline;
mod scaler;

pub use config::PreprocessingConfig;
pub use imputer::{is_numeric_dtype, numeric_values, ImputeStrategy, Imputer};
pub use pipeline::{FeaturePreparer, PreparedData};
pub use scaler::{ColumnScaling, ScalerType, ScalingParams};

use crate::error::Result;
use polars::prelude::DataFrame;

/// Prepare a table with the default configuration.
///
/// Returns the untouched table together with the standardized matrix and the
/// fitted scaling parameters.
pub fn prepare(table: DataFrame) -> Result<PreparedData> {
    FeaturePreparer::new().prepare(table)
}
