//! Risk scoring
//!
//! Combines the windowed observation ratios into a single 0-100 risk score:
//!
//! ```text
//! emotional_stability = max(0, 100 - emotional_instability%)
//! voice_sentiment     = max(0, 100 - voice_negativity%)
//! behavioral_patterns = 75
//! overall_risk        = 100 - mean(emotional_stability, voice_sentiment, behavioral_patterns)
//! ```

use crate::aggregator::ObservationAggregator;
use crate::config::RiskConfig;
use crate::types::{EmotionSample, RiskFactors, Session, VoiceSample};

/// Behavioral factor placeholder. No usage model feeds it.
pub const BEHAVIORAL_PATTERNS_SCORE: f64 = 75.0;

/// Risk scorer for monitoring sessions
pub struct RiskScorer;

impl RiskScorer {
    /// Risk factors for a session's current samples using the default windows
    pub fn factors(session: &Session) -> RiskFactors {
        Self::factors_from_samples(&session.emotion_data, &session.voice_data, &RiskConfig::default())
    }

    /// Risk factors for a session's current samples
    pub fn factors_with_config(session: &Session, config: &RiskConfig) -> RiskFactors {
        Self::factors_from_samples(&session.emotion_data, &session.voice_data, config)
    }

    /// Risk factors for raw sample sequences
    ///
    /// Returns all-zero factors when both sequences are empty.
    pub fn factors_from_samples(
        emotions: &[EmotionSample],
        voices: &[VoiceSample],
        config: &RiskConfig,
    ) -> RiskFactors {
        if emotions.is_empty() && voices.is_empty() {
            return RiskFactors::default();
        }

        let ratios = ObservationAggregator::live_with_windows(
            emotions,
            voices,
            config.emotion_window,
            config.voice_window,
        );

        let emotional_stability = (100.0 - ratios.emotional_instability_pct).max(0.0);
        let voice_sentiment = (100.0 - ratios.voice_negativity_pct).max(0.0);
        let behavioral_patterns = BEHAVIORAL_PATTERNS_SCORE;

        let overall_risk =
            100.0 - (emotional_stability + voice_sentiment + behavioral_patterns) / 3.0;

        RiskFactors {
            emotional_stability,
            voice_sentiment,
            behavioral_patterns,
            overall_risk: overall_risk.clamp(0.0, 100.0),
        }
    }
}

/// Overall risk (0-100) for a session's current samples
pub fn compute_risk_score(session: &Session) -> f64 {
    RiskScorer::factors(session).overall_risk
}

/// Overall risk (0-100) for a session's current samples with a custom configuration
pub fn compute_risk_score_with_config(session: &Session, config: &RiskConfig) -> f64 {
    RiskScorer::factors_with_config(session, config).overall_risk
}
