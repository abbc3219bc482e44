//! Evaluator and monitor configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, VisibilityError};

/// Configuration shared by an evaluator and the monitors created from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Base sampling cadence for threshold tests. A threshold window shorter
    /// than this is sampled at its own width.
    pub default_sample_interval_ms: u64,
    /// Fail evaluator construction when the host has no style query API.
    /// When false, style-dependent checks are skipped instead.
    pub strict_environment: bool,
    /// Minimum spacing between samples triggered by scroll/resize events
    pub event_throttle_ms: u64,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            default_sample_interval_ms: 100,
            strict_environment: true,
            event_throttle_ms: 50,
        }
    }
}

impl VisibilityConfig {
    /// Parse and validate a JSON configuration. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_sample_interval_ms == 0 {
            return Err(VisibilityError::invalid_config("default_sample_interval_ms must be positive"));
        }
        Ok(())
    }

    /// Sampling cadence for a threshold window of `duration_ms`
    pub fn sample_interval_for(&self, duration_ms: u64) -> u64 {
        self.default_sample_interval_ms.min(duration_ms).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = VisibilityConfig::from_json(r#"{ "strict_environment": false }"#).unwrap();
        assert!(!config.strict_environment);
        assert_eq!(config.default_sample_interval_ms, 100);
        assert_eq!(config.event_throttle_ms, 50);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = VisibilityConfig::from_json(r#"{ "default_sample_interval_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, VisibilityError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            VisibilityConfig::from_json("{ nope"),
            Err(VisibilityError::Json(_))
        ));
    }

    #[test]
    fn test_sample_interval_for() {
        let config = VisibilityConfig::default();
        assert_eq!(config.sample_interval_for(1000), 100);
        assert_eq!(config.sample_interval_for(40), 40);
        assert_eq!(config.sample_interval_for(0), 1);
    }
}
