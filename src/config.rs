//! Pipeline configuration
//!
//! Every field defaults to the values the portal shipped with, so an empty
//! JSON object yields the standard configuration.

use serde::{Deserialize, Serialize};

use crate::error::RiskError;

/// Trailing emotion window used by the live risk estimate
pub const DEFAULT_EMOTION_WINDOW: usize = 10;

/// Trailing voice window used by the live risk estimate
pub const DEFAULT_VOICE_WINDOW: usize = 5;

/// Scoring and alerting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Number of most recent emotion samples in the live estimate
    pub emotion_window: usize,
    /// Number of most recent voice samples in the live estimate
    pub voice_window: usize,
    /// Alert rule thresholds
    pub alerts: AlertThresholds,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            emotion_window: DEFAULT_EMOTION_WINDOW,
            voice_window: DEFAULT_VOICE_WINDOW,
            alerts: AlertThresholds::default(),
        }
    }
}

/// Thresholds for the per-session alert rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// Risk score strictly above this raises a critical alert
    pub critical_threshold: f64,
    /// Risk score strictly above this (and not critical) raises a high-risk alert
    pub high_risk_threshold: f64,
    /// Fraction of negative emotions strictly above this raises a behavioral alert
    pub negative_emotion_ratio: f64,
    /// Fraction of negative voice samples strictly above this raises a behavioral alert
    pub negative_voice_ratio: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            critical_threshold: 85.0,
            high_risk_threshold: 70.0,
            negative_emotion_ratio: 0.7,
            negative_voice_ratio: 0.6,
        }
    }
}

impl RiskConfig {
    /// Parse a configuration from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, RiskError> {
        let config: RiskConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration as pretty JSON
    pub fn to_json(&self) -> Result<String, RiskError> {
        serde_json::to_string_pretty(self).map_err(|e| RiskError::EncodingError(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), RiskError> {
        if self.emotion_window == 0 {
            return Err(RiskError::InvalidConfig(
                "emotion_window must be at least 1".to_string(),
            ));
        }
        if self.voice_window == 0 {
            return Err(RiskError::InvalidConfig(
                "voice_window must be at least 1".to_string(),
            ));
        }

        let alerts = &self.alerts;
        for (name, value) in [
            ("critical_threshold", alerts.critical_threshold),
            ("high_risk_threshold", alerts.high_risk_threshold),
        ] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(RiskError::InvalidConfig(format!(
                    "{name} must be within [0, 100], got {value}"
                )));
            }
        }
        if alerts.high_risk_threshold > alerts.critical_threshold {
            return Err(RiskError::InvalidConfig(format!(
                "high_risk_threshold ({}) exceeds critical_threshold ({})",
                alerts.high_risk_threshold, alerts.critical_threshold
            )));
        }
        for (name, value) in [
            ("negative_emotion_ratio", alerts.negative_emotion_ratio),
            ("negative_voice_ratio", alerts.negative_voice_ratio),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(RiskError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RiskConfig::default();
        assert_eq!(config.emotion_window, 10);
        assert_eq!(config.voice_window, 5);
        assert_eq!(config.alerts.critical_threshold, 85.0);
        assert_eq!(config.alerts.high_risk_threshold, 70.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RiskConfig::from_json(r#"{"voice_window": 8}"#).unwrap();
        assert_eq!(config.voice_window, 8);
        assert_eq!(config.emotion_window, DEFAULT_EMOTION_WINDOW);
        assert_eq!(config.alerts, AlertThresholds::default());
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = RiskConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(RiskConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_zero_window() {
        let result = RiskConfig::from_json(r#"{"emotion_window": 0}"#);
        assert!(matches!(result, Err(RiskError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let json = r#"{"alerts": {"critical_threshold": 60, "high_risk_threshold": 75}}"#;
        assert!(matches!(
            RiskConfig::from_json(json),
            Err(RiskError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_ratio_out_of_range() {
        let json = r#"{"alerts": {"negative_voice_ratio": 1.5}}"#;
        assert!(RiskConfig::from_json(json).is_err());
    }
}
