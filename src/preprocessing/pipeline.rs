//! Feature preparation: raw table to standardized matrix

use crate::error::{Result, SentinelError};
use super::{
    config::PreprocessingConfig,
    imputer::{is_numeric_dtype, numeric_column, Imputer},
    scaler::{ColumnScaling, ScalingParams},
};
use ndarray::Array2;
use polars::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Output of [`FeaturePreparer::prepare`]
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// The input table, untouched; every original field is still present
    pub table: DataFrame,
    /// Standardized feature matrix, one row per record
    pub matrix: Array2<f64>,
    /// Per-column fill value, mean and std fitted on `table`
    pub scaling: ScalingParams,
    /// Numeric columns dropped for having a single distinct value
    pub dropped_columns: Vec<String>,
}

impl PreparedData {
    /// Retained feature names, in matrix column order
    pub fn feature_names(&self) -> Vec<String> {
        self.scaling.feature_names()
    }
}

/// Turns a raw table into the numeric matrix the detector trains on
#[derive(Debug, Clone, Default)]
pub struct FeaturePreparer {
    config: PreprocessingConfig,
}

impl FeaturePreparer {
    /// Create a preparer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a preparer with custom configuration
    pub fn with_config(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    /// Select numeric fields, impute, drop constant fields and standardize.
    pub fn prepare(&self, table: DataFrame) -> Result<PreparedData> {
        let start = Instant::now();

        if table.height() == 0 {
            return Err(SentinelError::EmptyInput);
        }

        // A field with no values at all is read back as text; it still has nothing to impute from
        if let Some(col) = table
            .get_columns()
            .iter()
            .find(|col| col.null_count() == table.height())
        {
            return Err(SentinelError::Schema(format!(
                "column '{}' has no non-missing values to impute from",
                col.name()
            )));
        }

        let (numeric, skipped): (Vec<&Column>, Vec<&Column>) = table
            .get_columns()
            .iter()
            .partition(|col| is_numeric_dtype(col.dtype()));

        for col in &skipped {
            debug!(column = %col.name(), dtype = %col.dtype(), "Skipping non-numeric column");
        }

        if numeric.is_empty() {
            return Err(SentinelError::Schema(
                "input has no numeric columns".to_string(),
            ));
        }

        let imputer = Imputer::new(self.config.numeric_impute_strategy);
        let mut params = Vec::with_capacity(numeric.len());
        let mut imputed_columns = Vec::with_capacity(numeric.len());
        let mut dropped_columns = Vec::new();

        for col in numeric {
            let values = numeric_column(col)?;
            let n_missing = values.null_count();

            let fill_value = imputer.fit_column(&values)?;
            let imputed = Imputer::fill(&values, fill_value)?;

            if imputed.min() == imputed.max() {
                warn!(column = %col.name(), "Dropping constant column");
                dropped_columns.push(col.name().to_string());
                continue;
            }

            if n_missing > 0 {
                debug!(column = %col.name(), n_missing, fill_value, "Imputed missing values");
            }

            params.push(ColumnScaling::fit(&imputed, fill_value, self.config.scaler_type)?);
            imputed_columns.push(imputed);
        }

        if params.is_empty() {
            return Err(SentinelError::Schema(format!(
                "all {} numeric columns are constant",
                dropped_columns.len()
            )));
        }

        let scaling = ScalingParams::new(params);
        let matrix = scaling.scale_columns(&imputed_columns)?;

        info!(
            n_rows = matrix.nrows(),
            n_features = matrix.ncols(),
            n_dropped = dropped_columns.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Prepared feature matrix"
        );

        Ok(PreparedData {
            table,
            matrix,
            scaling,
            dropped_columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::ScalerType;

    fn kpi_table() -> DataFrame {
        df!(
            "cell_id" => &["A", "B", "C", "D", "E"],
            "throughput" => &[Some(100.0), Some(120.0), None, Some(80.0), Some(90.0)],
            "latency" => &[10i64, 12, 11, 30, 9],
            "band" => &[3.5, 3.5, 3.5, 3.5, 3.5]
        )
        .unwrap()
    }

    #[test]
    fn test_prepare_selects_numeric_and_drops_constant() {
        let prepared = FeaturePreparer::new().prepare(kpi_table()).unwrap();

        assert_eq!(prepared.feature_names(), vec!["throughput", "latency"]);
        assert_eq!(prepared.dropped_columns, vec!["band"]);
        assert_eq!(prepared.matrix.shape(), &[5, 2]);
        // Original table keeps every field
        assert_eq!(prepared.table.width(), 4);
    }

    #[test]
    fn test_prepare_fills_with_median() {
        let prepared = FeaturePreparer::new().prepare(kpi_table()).unwrap();
        let throughput = &prepared.scaling.columns()[0];
        // median of 100, 120, 80, 90
        assert_eq!(throughput.fill_value, 95.0);
        assert!(prepared.matrix.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_prepare_without_scaling_keeps_values() {
        let preparer =
            FeaturePreparer::with_config(PreprocessingConfig::new().with_scaler(ScalerType::None));
        let prepared = preparer.prepare(kpi_table()).unwrap();
        assert_eq!(prepared.matrix[[2, 0]], 95.0);
        assert_eq!(prepared.matrix[[3, 1]], 30.0);
    }

    #[test]
    fn test_prepare_empty_table() {
        let df = df!("a" => Vec::<f64>::new()).unwrap();
        assert!(matches!(
            FeaturePreparer::new().prepare(df),
            Err(SentinelError::EmptyInput)
        ));
    }

    #[test]
    fn test_prepare_no_numeric_columns() {
        let df = df!("name" => &["a", "b"]).unwrap();
        assert!(matches!(
            FeaturePreparer::new().prepare(df),
            Err(SentinelError::Schema(_))
        ));
    }

    #[test]
    fn test_prepare_all_missing_column_is_fatal() {
        let df = df!(
            "ok" => &[1.0, 2.0, 3.0],
            "empty" => &[None::<f64>, None, None]
        )
        .unwrap();
        let err = FeaturePreparer::new().prepare(df).unwrap_err();
        assert!(matches!(err, SentinelError::Schema(msg) if msg.contains("empty")));
    }

    #[test]
    fn test_prepare_all_missing_text_column_is_fatal() {
        let df = df!(
            "ok" => &[1.0, 2.0, 3.0],
            "blank" => &[None::<&str>, None, None]
        )
        .unwrap();
        let err = FeaturePreparer::new().prepare(df).unwrap_err();
        assert!(matches!(err, SentinelError::Schema(msg) if msg.contains("blank")));
    }
}
