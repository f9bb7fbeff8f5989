//! Reporting over scored samples
//!
//! Joins scores and labels back to the raw records by row position and offers
//! the views a dashboard or export needs: totals, sorted and filtered
//! anomalies, per-label feature breakdowns and a flat exportable table.

mod summary;

pub use summary::{FeatureSummary, LabelGroupSummary, RiskLevel};

use crate::anomaly::{Label, ScoredSample};
use crate::error::{Result, SentinelError};
use crate::preprocessing::{is_numeric_dtype, numeric_values};
use crate::utils::stats;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Name of the exported label column (-1 anomalous, 1 normal)
pub const LABEL_COLUMN: &str = "anomaly";
/// Name of the exported score column
pub const SCORE_COLUMN: &str = "anomaly_score";

/// Score window and row cap applied to the sorted anomalies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFilter {
    /// Keep anomalies with score >= min_score
    pub min_score: Option<f64>,
    /// Keep anomalies with score <= max_score
    pub max_score: Option<f64>,
    /// Keep at most this many, most anomalous first
    pub limit: Option<usize>,
}

impl AnomalyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_score(mut self, score: f64) -> Self {
        self.min_score = Some(score);
        self
    }

    pub fn with_max_score(mut self, score: f64) -> Self {
        self.max_score = Some(score);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn accepts(&self, score: f64) -> bool {
        self.min_score.map_or(true, |min| score >= min)
            && self.max_score.map_or(true, |max| score <= max)
    }
}

/// Scored samples joined to the table they were computed from
#[derive(Debug, Clone)]
pub struct AnomalyReport {
    table: DataFrame,
    feature_names: Vec<String>,
    samples: Vec<ScoredSample>,
}

impl AnomalyReport {
    /// Join one scored sample per table row.
    pub fn new(
        table: DataFrame,
        feature_names: Vec<String>,
        mut samples: Vec<ScoredSample>,
    ) -> Result<Self> {
        if samples.len() != table.height() {
            return Err(SentinelError::SchemaMismatch {
                expected: format!("{} scored samples", table.height()),
                actual: format!("{} scored samples", samples.len()),
            });
        }

        samples.sort_by_key(|s| s.index);
        if samples.iter().enumerate().any(|(i, s)| s.index != i) {
            return Err(SentinelError::DataError(
                "scored samples must cover each table row exactly once".to_string(),
            ));
        }

        Ok(Self {
            table,
            feature_names,
            samples,
        })
    }

    pub fn table(&self) -> &DataFrame {
        &self.table
    }

    /// Features the detector was trained on
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// All samples in row order
    pub fn samples(&self) -> &[ScoredSample] {
        &self.samples
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn n_anomalies(&self) -> usize {
        self.samples.iter().filter(|s| s.label.is_anomalous()).count()
    }

    pub fn anomaly_rate(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.n_anomalies() as f64 / self.n_samples() as f64
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_rate(self.anomaly_rate())
    }

    pub fn mean_score(&self) -> Option<f64> {
        stats::mean(&self.scores())
    }

    /// Score at quantile `q` of all samples (linear interpolation)
    pub fn score_quantile(&self, q: f64) -> Option<f64> {
        stats::quantile(&self.scores(), q)
    }

    fn scores(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.score).collect()
    }

    /// Anomalous samples, most anomalous (lowest score) first; row order breaks ties
    pub fn anomalies(&self) -> Vec<&ScoredSample> {
        let mut anomalies: Vec<&ScoredSample> = self
            .samples
            .iter()
            .filter(|s| s.label.is_anomalous())
            .collect();
        anomalies.sort_by(|a, b| a.score.total_cmp(&b.score));
        anomalies
    }

    /// Sorted anomalies restricted by `filter`
    pub fn filter(&self, filter: &AnomalyFilter) -> Vec<&ScoredSample> {
        let kept = self
            .anomalies()
            .into_iter()
            .filter(|s| filter.accepts(s.score));
        match filter.limit {
            Some(limit) => kept.take(limit).collect(),
            None => kept.collect(),
        }
    }

    /// Statistics of a raw table column split by label; missing values are skipped
    pub fn feature_summary(&self, feature: &str) -> Result<LabelGroupSummary> {
        let column = self
            .table
            .column(feature)
            .map_err(|_| SentinelError::FeatureNotFound(feature.to_string()))?;
        if !is_numeric_dtype(column.dtype()) {
            return Err(SentinelError::FeatureNotFound(format!(
                "{} (not numeric)",
                feature
            )));
        }

        let values = numeric_values(column)?;
        let mut normal = Vec::new();
        let mut anomalous = Vec::new();
        for (value, sample) in values.into_iter().zip(&self.samples) {
            if let Some(v) = value {
                match sample.label {
                    Label::Normal => normal.push(v),
                    Label::Anomalous => anomalous.push(v),
                }
            }
        }

        Ok(LabelGroupSummary {
            feature: feature.to_string(),
            normal: FeatureSummary::from_values(&normal),
            anomalous: FeatureSummary::from_values(&anomalous),
        })
    }

    /// Every original field plus the label and score columns
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let labels: Vec<i32> = self.samples.iter().map(|s| s.label.as_i32()).collect();
        let scores = self.scores();

        let mut df = self.table.clone();
        df.with_column(Series::new(LABEL_COLUMN.into(), labels))?;
        df.with_column(Series::new(SCORE_COLUMN.into(), scores))?;
        Ok(df)
    }

    /// Export rows for the filtered anomalies, in filter order
    pub fn anomalies_dataframe(&self, filter: &AnomalyFilter) -> Result<DataFrame> {
        let rows: Vec<IdxSize> = self
            .filter(filter)
            .iter()
            .map(|s| s.index as IdxSize)
            .collect();
        let idx = IdxCa::from_vec("idx".into(), rows);
        Ok(self.to_dataframe()?.take(&idx)?)
    }
}
