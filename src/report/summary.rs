//! Summary statistics for the reporting layer

use crate::utils::stats;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Describe-style statistics of one feature within one label group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    /// Non-missing values counted
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (ddof = 1)
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub median: Option<f64>,
    pub max: Option<f64>,
}

impl FeatureSummary {
    pub fn from_values(values: &[f64]) -> Self {
        let (min, max) = match stats::min_max(values) {
            Some((lo, hi)) => (Some(lo), Some(hi)),
            None => (None, None),
        };
        Self {
            count: values.len(),
            mean: stats::mean(values),
            std: stats::std_dev(values, 1),
            min,
            median: stats::median(values),
            max,
        }
    }
}

/// Side-by-side statistics of one feature for normal and anomalous samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelGroupSummary {
    pub feature: String,
    pub normal: FeatureSummary,
    pub anomalous: FeatureSummary,
}

/// Network health derived from the anomaly rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Rate below 5%
    Stable,
    /// Rate below 15%
    Watch,
    /// Rate of 15% or more
    Critical,
}

impl RiskLevel {
    pub fn from_rate(rate: f64) -> Self {
        if rate < 0.05 {
            RiskLevel::Stable
        } else if rate < 0.15 {
            RiskLevel::Watch
        } else {
            RiskLevel::Critical
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Stable => write!(f, "stable"),
            RiskLevel::Watch => write!(f, "watch"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}
