//! End-to-end detection configuration

use crate::anomaly::ForestConfig;
use crate::error::Result;
use crate::preprocessing::PreprocessingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a full prepare → train → score run.
///
/// Every field has a default, so a JSON file only needs the values it
/// overrides, e.g. `{"forest": {"contamination": 0.02}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Feature preparation settings
    pub preprocessing: PreprocessingConfig,
    /// Isolation forest settings
    pub forest: ForestConfig,
}

impl DetectionConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preprocessing(mut self, preprocessing: PreprocessingConfig) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every data-independent setting
    pub fn validate(&self) -> Result<()> {
        self.forest.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::MaxSamples;
    use crate::error::SentinelError;
    use crate::preprocessing::ScalerType;

    #[test]
    fn test_partial_json_overrides_defaults() {
        let config = DetectionConfig::from_json_str(
            r#"{"forest": {"contamination": 0.02, "max_samples": {"Count": 128}}}"#,
        )
        .unwrap();

        assert_eq!(config.forest.contamination, 0.02);
        assert_eq!(config.forest.max_samples, MaxSamples::Count(128));
        assert_eq!(config.forest.n_estimators, 200);
        assert_eq!(config.preprocessing.scaler_type, ScalerType::Standard);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = DetectionConfig::from_json_str(r#"{"forest": {"contamination": 0.8}}"#)
            .unwrap_err();
        assert!(matches!(err, SentinelError::InvalidConfig { .. }));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            DetectionConfig::from_json_str("{forest"),
            Err(SentinelError::SerializationError(_))
        ));
    }

    #[test]
    fn test_from_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"forest": {{"n_estimators": 50, "random_state": 7}}}}"#).unwrap();
        file.flush().unwrap();

        let config = DetectionConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.forest.n_estimators, 50);
        assert_eq!(config.forest.random_state, 7);
    }
}
