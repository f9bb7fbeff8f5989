//! Missing value imputation for numeric columns

use crate::error::{Result, SentinelError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Strategy for imputing missing numeric values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with the median of the observed values
    Median,
    /// Replace with the mean of the observed values
    Mean,
}

impl Default for ImputeStrategy {
    fn default() -> Self {
        ImputeStrategy::Median
    }
}

/// Check if dtype is numeric (integers and floats; booleans excluded)
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Cast a numeric column to `Float64`.
///
/// Nulls and non-finite values (NaN, ±inf) come back as nulls so they are
/// imputed like any other missing entry.
pub fn numeric_column(column: &Column) -> Result<Float64Chunked> {
    let series = column
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let finite: Float64Chunked = series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect();
    Ok(finite.with_name(column.name().clone()))
}

/// Read a numeric column as `f64` values, `None` where missing
pub fn numeric_values(column: &Column) -> Result<Vec<Option<f64>>> {
    Ok(numeric_column(column)?.into_iter().collect())
}

/// Imputer for a single numeric column at a time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
}

impl Imputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self { strategy }
    }

    /// Compute the fill value for a column.
    ///
    /// A column with no observed values has nothing to impute from and is rejected.
    pub fn fit_column(&self, ca: &Float64Chunked) -> Result<f64> {
        let fill = match self.strategy {
            ImputeStrategy::Median => ca.median(),
            ImputeStrategy::Mean => ca.mean(),
        };

        match fill {
            Some(v) if v.is_finite() => Ok(v),
            Some(v) => Err(SentinelError::DataError(format!(
                "column '{}' fill value {} is not finite",
                ca.name(),
                v
            ))),
            None => Err(SentinelError::Schema(format!(
                "column '{}' has no non-missing values to impute from",
                ca.name()
            ))),
        }
    }

    /// Replace missing entries with `fill`
    pub fn fill(ca: &Float64Chunked, fill: f64) -> Result<Float64Chunked> {
        Ok(ca.fill_null_with_values(fill)?)
    }
}

impl Default for Imputer {
    fn default() -> Self {
        Self::new(ImputeStrategy::default())
    }
}
