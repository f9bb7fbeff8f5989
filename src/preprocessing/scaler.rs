//! Feature scaling and the reusable per-column parameters

use super::imputer::{is_numeric_dtype, numeric_column, Imputer};
use crate::error::{Result, SentinelError};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Type of scaler to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// No scaling
    None,
}

impl Default for ScalerType {
    fn default() -> Self {
        ScalerType::Standard
    }
}

/// Fitted parameters for one retained column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnScaling {
    /// Column name in the raw table
    pub name: String,
    /// Value substituted for missing entries
    pub fill_value: f64,
    /// Centre subtracted before scaling
    pub mean: f64,
    /// Divisor applied after centring; never zero
    pub std: f64,
}

impl ColumnScaling {
    /// Fit on an already-imputed, non-constant column.
    ///
    /// Standard scaling uses the population standard deviation (ddof = 0).
    /// Values whose mean or spread overflows `f64` are rejected.
    pub fn fit(imputed: &Float64Chunked, fill_value: f64, scaler_type: ScalerType) -> Result<Self> {
        let name = imputed.name().to_string();
        let (mean, std) = match scaler_type {
            ScalerType::Standard => {
                let mean = imputed.mean().unwrap_or(0.0);
                let std = imputed.std(0).unwrap_or(1.0);
                if !mean.is_finite() || !std.is_finite() {
                    return Err(SentinelError::DataError(format!(
                        "column '{}' is too large to standardize (mean {}, std {})",
                        name, mean, std
                    )));
                }
                (mean, if std > 0.0 { std } else { 1.0 })
            }
            ScalerType::None => (0.0, 1.0),
        };

        Ok(Self {
            name,
            fill_value,
            mean,
            std,
        })
    }

    #[inline]
    pub fn scale(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }

    #[inline]
    pub fn unscale(&self, value: f64) -> f64 {
        value * self.std + self.mean
    }
}

/// Scaling parameters for every retained column, in matrix column order.
///
/// Computed once on the training table and reused unchanged for any later
/// table with the same schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingParams {
    columns: Vec<ColumnScaling>,
}

impl ScalingParams {
    pub fn new(columns: Vec<ColumnScaling>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnScaling] {
        &self.columns
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    /// Retained feature names, in matrix column order
    pub fn feature_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Build the scaled matrix from imputed columns, one per retained feature
    pub fn scale_columns(&self, imputed: &[Float64Chunked]) -> Result<Array2<f64>> {
        if imputed.len() != self.columns.len() {
            return Err(SentinelError::SchemaMismatch {
                expected: format!("{} columns", self.columns.len()),
                actual: format!("{} columns", imputed.len()),
            });
        }
        let n_rows = imputed.first().map(|c| c.len()).unwrap_or(0);
        if let Some(bad) = imputed.iter().position(|c| c.len() != n_rows) {
            return Err(SentinelError::DataError(format!(
                "column '{}' has {} rows, expected {}",
                self.columns[bad].name,
                imputed[bad].len(),
                n_rows
            )));
        }

        let mut x = Array2::zeros((n_rows, self.columns.len()));
        for (j, (params, ca)) in self.columns.iter().zip(imputed).enumerate() {
            if ca.null_count() > 0 {
                return Err(SentinelError::DataError(format!(
                    "column '{}' still has missing values",
                    params.name
                )));
            }
            for (i, v) in ca.into_no_null_iter().enumerate() {
                let scaled = params.scale(v);
                if !scaled.is_finite() {
                    return Err(SentinelError::DataError(format!(
                        "column '{}' row {} does not scale to a finite value",
                        params.name, i
                    )));
                }
                x[[i, j]] = scaled;
            }
        }
        Ok(x)
    }

    /// Impute and standardize a table with the fitted parameters.
    ///
    /// Columns are looked up by name; extra columns are ignored. A retained
    /// column that is absent or non-numeric is a schema mismatch.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let imputed: Vec<Float64Chunked> = self
            .columns
            .iter()
            .map(|params| {
                let column = df.column(&params.name).map_err(|_| SentinelError::SchemaMismatch {
                    expected: format!("numeric column '{}'", params.name),
                    actual: "missing column".to_string(),
                })?;
                if !is_numeric_dtype(column.dtype()) {
                    return Err(SentinelError::SchemaMismatch {
                        expected: format!("numeric column '{}'", params.name),
                        actual: format!("{}", column.dtype()),
                    });
                }
                Imputer::fill(&numeric_column(column)?, params.fill_value)
            })
            .collect::<Result<Vec<_>>>()?;

        if imputed.is_empty() {
            return Ok(Array2::zeros((df.height(), 0)));
        }
        self.scale_columns(&imputed)
    }
}
