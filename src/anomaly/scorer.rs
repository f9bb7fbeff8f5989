//! Score-to-label decision policy

use serde::{Deserialize, Serialize};
use std::fmt;

/// Decision for a single sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Normal,
    Anomalous,
}

impl Label {
    /// Encoded as -1 for anomalies and 1 for normal samples in exported tables
    pub fn as_i32(self) -> i32 {
        match self {
            Label::Normal => 1,
            Label::Anomalous => -1,
        }
    }

    pub fn is_anomalous(self) -> bool {
        self == Label::Anomalous
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Normal => write!(f, "normal"),
            Label::Anomalous => write!(f, "anomalous"),
        }
    }
}

/// Score and label for one row of the scored matrix.
///
/// `score` is the decision value: lower means more anomalous, and negative
/// values are always anomalous.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredSample {
    /// Row position in the scored matrix (and the raw table it came from)
    pub index: usize,
    pub score: f64,
    pub label: Label,
}

/// Decision boundary fitted on the training-time normality scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionThreshold {
    /// Normality score of the last sample counted as anomalous
    pub offset: f64,
    /// How many samples tied exactly at `offset` are anomalous
    pub tie_quota: usize,
    /// Anomalies labelled in the training set
    pub n_anomalies: usize,
}

impl DecisionThreshold {
    /// Fit on training normality scores (lower = more anomalous).
    ///
    /// round(contamination · n) samples are anomalous. Samples are ranked by
    /// score, and among equal scores the later row ranks as more anomalous, so
    /// earlier rows stay normal at the boundary.
    pub fn fit(normality: &[f64], contamination: f64) -> Self {
        let n = normality.len();
        let k = ((contamination * n as f64).round() as usize).min(n);

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| normality[a].total_cmp(&normality[b]).then(b.cmp(&a)));

        if k == 0 {
            let offset = order.first().map(|&i| normality[i]).unwrap_or(0.0);
            return Self {
                offset,
                tie_quota: 0,
                n_anomalies: 0,
            };
        }

        let offset = normality[order[k - 1]];
        let tie_quota = order[..k]
            .iter()
            .filter(|&&i| normality[i] == offset)
            .count();

        Self {
            offset,
            tie_quota,
            n_anomalies: k,
        }
    }

    /// Decision values: normality shifted so the boundary sits at zero
    pub fn decision(&self, normality: &[f64]) -> Vec<f64> {
        normality.iter().map(|&s| s - self.offset).collect()
    }

    /// Label decision values.
    ///
    /// Below zero is anomalous. Exact zeros are boundary ties: the last
    /// `tie_quota` of them in input order are anomalous, the rest normal.
    pub fn label(&self, decision: &[f64]) -> Vec<Label> {
        let mut labels: Vec<Label> = decision
            .iter()
            .map(|&d| if d < 0.0 { Label::Anomalous } else { Label::Normal })
            .collect();

        let mut remaining = self.tie_quota;
        for (i, &d) in decision.iter().enumerate().rev() {
            if remaining == 0 {
                break;
            }
            if d == 0.0 {
                labels[i] = Label::Anomalous;
                remaining -= 1;
            }
        }

        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anomalous_rows(labels: &[Label]) -> Vec<usize> {
        labels
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_anomalous())
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_lowest_scores_are_anomalous() {
        let normality = [-0.40, -0.45, -0.80, -0.42, -0.75, -0.41, -0.44, -0.43, -0.39, -0.46];
        let threshold = DecisionThreshold::fit(&normality, 0.2);
        assert_eq!(threshold.n_anomalies, 2);
        assert_eq!(threshold.offset, -0.75);

        let labels = threshold.label(&threshold.decision(&normality));
        assert_eq!(anomalous_rows(&labels), vec![2, 4]);
    }

    #[test]
    fn test_ties_keep_earlier_rows_normal() {
        // Four rows tie at the boundary; one of them must be anomalous
        let normality = [-0.5, -0.6, -0.6, -0.9, -0.6, -0.6, -0.4, -0.3, -0.5, -0.4];
        let threshold = DecisionThreshold::fit(&normality, 0.2);
        assert_eq!(threshold.offset, -0.6);
        assert_eq!(threshold.tie_quota, 1);

        let labels = threshold.label(&threshold.decision(&normality));
        assert_eq!(anomalous_rows(&labels), vec![3, 5]);
    }

    #[test]
    fn test_count_matches_contamination() {
        let normality: Vec<f64> = (0..1000).map(|i| -((i * 7919 % 1000) as f64) / 1000.0).collect();
        let threshold = DecisionThreshold::fit(&normality, 0.05);
        let labels = threshold.label(&threshold.decision(&normality));
        assert_eq!(labels.iter().filter(|l| l.is_anomalous()).count(), 50);
    }

    #[test]
    fn test_zero_quota_when_contamination_rounds_down() {
        let normality = [-0.5, -0.6, -0.7];
        let threshold = DecisionThreshold::fit(&normality, 0.1);
        assert_eq!(threshold.n_anomalies, 0);

        let labels = threshold.label(&threshold.decision(&normality));
        assert!(labels.iter().all(|l| *l == Label::Normal));
    }

    #[test]
    fn test_label_encoding() {
        assert_eq!(Label::Anomalous.as_i32(), -1);
        assert_eq!(Label::Normal.as_i32(), 1);
        assert_eq!(Label::Anomalous.to_string(), "anomalous");
    }
}
