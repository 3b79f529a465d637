//! Pipeline orchestration
//!
//! This module provides the JSON-facing API for MindBridge Risk. Each call
//! parses persisted sessions, validates them, runs the relevant pipeline stages
//! and encodes the result:
//!
//! 1. Parse - sessions from JSON (a single object or an array)
//! 2. Validate - identifiers, timing and sample ranges
//! 3. Aggregate / Score / Classify / Alert
//! 4. Encode - result back to JSON

use serde::Serialize;
use tracing::{debug, info};

use crate::alerts::generate_alerts_with_config;
use crate::config::RiskConfig;
use crate::error::RiskError;
use crate::report::SessionReport;
use crate::scorer::RiskScorer;
use crate::severity::classify_severity;
use crate::trends::summarize_patients;
use crate::types::{RiskFactors, Session};

/// Compute the risk factors for a single session JSON object.
///
/// # Arguments
/// * `session_json` - A persisted session (camelCase fields)
///
/// # Returns
/// Risk factors JSON with the overall risk score
///
/// # Example
/// ```ignore
/// let factors_json = session_risk_score(session_json)?;
/// ```
pub fn session_risk_score(session_json: String) -> Result<String, RiskError> {
    RiskProcessor::new().score(&session_json)
}

/// Build the analysis report for a single session JSON object.
pub fn session_report_json(session_json: String) -> Result<String, RiskError> {
    RiskProcessor::new().report(&session_json)
}

/// Generate therapist alerts for a JSON array of sessions.
///
/// # Returns
/// JSON array of alerts, newest first
pub fn alerts_json(sessions_json: String) -> Result<String, RiskError> {
    RiskProcessor::new().alerts(&sessions_json)
}

/// Summarize risk history per patient for a JSON array of sessions.
pub fn patient_summaries_json(sessions_json: String) -> Result<String, RiskError> {
    RiskProcessor::new().patient_summaries(&sessions_json)
}

/// Classify a bare risk score into its clinical severity tier.
pub fn severity_json(score: f64) -> Result<String, RiskError> {
    encode(&classify_severity(score))
}

/// Parse a single session and validate it
pub fn parse_session(json: &str) -> Result<Session, RiskError> {
    let session: Session = serde_json::from_str(json)?;
    session.validate()?;
    Ok(session)
}

/// Parse an array of sessions (or a single session object) and validate each
pub fn parse_sessions(json: &str) -> Result<Vec<Session>, RiskError> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    let sessions: Vec<Session> = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        serde_json::Value::Object(_) => vec![serde_json::from_value(value)?],
        other => {
            return Err(RiskError::ParseError(format!(
                "expected a session object or array, found {}",
                json_kind(&other)
            )))
        }
    };

    for session in &sessions {
        session.validate()?;
    }
    debug!(count = sessions.len(), "parsed sessions");
    Ok(sessions)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, RiskError> {
    serde_json::to_string(value).map_err(|e| RiskError::EncodingError(e.to_string()))
}

/// Scored view of a session as returned by [`RiskProcessor::score`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredSession {
    pub session_id: String,
    pub patient_id: String,
    pub risk_factors: RiskFactors,
}

/// Processor carrying a validated configuration across calls.
///
/// Use this when the thresholds or windows differ from the defaults.
pub struct RiskProcessor {
    config: RiskConfig,
}

impl Default for RiskProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskProcessor {
    /// Create a processor with the default configuration
    pub fn new() -> Self {
        Self {
            config: RiskConfig::default(),
        }
    }

    /// Create a processor with a custom configuration
    pub fn with_config(config: RiskConfig) -> Result<Self, RiskError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Load the configuration from JSON
    pub fn load_config(&mut self, json: &str) -> Result<(), RiskError> {
        self.config = RiskConfig::from_json(json)?;
        Ok(())
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Score a session's current samples over the trailing windows
    pub fn score_session(&self, session: &Session) -> RiskFactors {
        RiskScorer::factors_with_config(session, &self.config)
    }

    /// Score a single session JSON object
    pub fn score(&self, session_json: &str) -> Result<String, RiskError> {
        let session = parse_session(session_json)?;
        let risk_factors = self.score_session(&session);

        info!(
            session_id = %session.id,
            overall_risk = risk_factors.overall_risk,
            "scored session"
        );
        encode(&ScoredSession {
            session_id: session.id,
            patient_id: session.patient_id,
            risk_factors,
        })
    }

    /// Build the analysis report for a single session JSON object
    pub fn report(&self, session_json: &str) -> Result<String, RiskError> {
        let session = parse_session(session_json)?;
        let report = SessionReport::build(&session);
        debug!(session_id = %session.id, level = ?report.severity.level, "built session report");
        encode(&report)
    }

    /// Generate alerts for a JSON array of sessions
    pub fn alerts(&self, sessions_json: &str) -> Result<String, RiskError> {
        let sessions = parse_sessions(sessions_json)?;
        let alerts = generate_alerts_with_config(&sessions, &self.config);
        info!(sessions = sessions.len(), alerts = alerts.len(), "generated alerts");
        encode(&alerts)
    }

    /// Summarize risk history per patient for a JSON array of sessions
    pub fn patient_summaries(&self, sessions_json: &str) -> Result<String, RiskError> {
        let sessions = parse_sessions(sessions_json)?;
        encode(&summarize_patients(&sessions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::generate_alerts;
    use crate::scorer::compute_risk_score;
    use crate::severity::SeverityLevel;
    use crate::types::{AlertType, Emotion, EmotionSample, Sentiment, VoiceSample};
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn sample_session_json() -> &'static str {
        r#"{
            "id": "1718031600000",
            "patientId": "patient-3317",
            "startTime": "2024-06-10T15:00:00Z",
            "endTime": "2024-06-10T15:20:00Z",
            "emotionData": [
                { "timestamp": "2024-06-10T15:00:03Z", "emotion": "sad", "confidence": 0.91, "intensity": 0.62 },
                { "timestamp": "2024-06-10T15:00:06Z", "emotion": "angry", "confidence": 0.84, "intensity": 0.71 },
                { "timestamp": "2024-06-10T15:00:09Z", "emotion": "neutral", "confidence": 0.77, "intensity": 0.35 },
                { "timestamp": "2024-06-10T15:00:12Z", "emotion": "happy", "confidence": 0.88, "intensity": 0.55 }
            ],
            "voiceData": [
                { "timestamp": "2024-06-10T15:05:00Z", "transcription": "I feel tired all the time", "sentiment": "negative", "confidence": 0.9, "stressLevel": 0.7 },
                { "timestamp": "2024-06-10T15:10:00Z", "transcription": "work was okay", "sentiment": "neutral", "confidence": 0.8, "stressLevel": 0.4 }
            ],
            "riskScore": 41.67
        }"#
    }

    fn scenario_session(id: &str, hour: u32) -> Session {
        let start = Utc.with_ymd_and_hms(2024, 6, 11, hour, 0, 0).unwrap();
        let mut session = Session::new(id, format!("patient-{id}"), start);
        session.end_time = Some(start + Duration::minutes(15));
        session
    }

    #[test]
    fn test_session_risk_score() {
        let result = session_risk_score(sample_session_json().to_string());
        assert!(result.is_ok());

        let payload: serde_json::Value = serde_json::from_str(&result.unwrap()).unwrap();
        assert_eq!(payload["sessionId"], "1718031600000");
        assert_eq!(payload["riskFactors"]["emotionalStability"], 50.0);
        assert_eq!(payload["riskFactors"]["voiceSentiment"], 50.0);
        assert_eq!(payload["riskFactors"]["behavioralPatterns"], 75.0);

        let risk = payload["riskFactors"]["overallRisk"].as_f64().unwrap();
        assert!((risk - (100.0 - 175.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_session_report_json() {
        let result = session_report_json(sample_session_json().to_string()).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&result).unwrap();

        assert_eq!(payload["session_id"], "1718031600000");
        assert_eq!(payload["severity"]["level"], "mild");
        assert_eq!(payload["risk_level"], "moderate");
        assert_eq!(payload["metrics"]["emotional_negativity_pct"], 50.0);
        assert_eq!(payload["duration_sec"], 1200);
    }

    #[test]
    fn test_alerts_json_accepts_single_object() {
        let result = alerts_json(sample_session_json().to_string()).unwrap();
        let alerts: serde_json::Value = serde_json::from_str(&result).unwrap();
        // 41.67 risk, 2/4 negative emotions, 1/2 negative voice: nothing fires
        assert_eq!(alerts.as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_patient_summaries_json() {
        let json = format!("[{}]", sample_session_json());
        let result = patient_summaries_json(json).unwrap();
        let summaries: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(summaries[0]["patient_id"], "patient-3317");
        assert_eq!(summaries[0]["current_risk"], 41.67);
    }

    #[test]
    fn test_severity_json() {
        let payload: serde_json::Value =
            serde_json::from_str(&severity_json(90.0).unwrap()).unwrap();
        assert_eq!(payload["label"], "Severe Depression");
        assert_eq!(payload["recommendations"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            session_risk_score("not valid json".to_string()),
            Err(RiskError::JsonError(_))
        ));
        assert!(matches!(
            alerts_json("42".to_string()),
            Err(RiskError::ParseError(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_session() {
        let json = sample_session_json().replace("\"riskScore\": 41.67", "\"riskScore\": 140");
        assert!(matches!(
            session_report_json(json),
            Err(RiskError::InvalidSession(_))
        ));
    }

    #[test]
    fn test_processor_with_config() {
        let mut processor = RiskProcessor::new();
        processor
            .load_config(r#"{"alerts": {"high_risk_threshold": 40}}"#)
            .unwrap();

        let alerts: serde_json::Value =
            serde_json::from_str(&processor.alerts(sample_session_json()).unwrap()).unwrap();
        assert_eq!(alerts[0]["type"], "high_risk");
        assert_eq!(alerts[0]["id"], "risk-1718031600000");
    }

    #[test]
    fn test_processor_rejects_bad_config() {
        let config = RiskConfig {
            voice_window: 0,
            ..RiskConfig::default()
        };
        assert!(RiskProcessor::with_config(config).is_err());
    }

    #[test]
    fn test_scenario_negative_emotions_without_voice() {
        let mut session = scenario_session("a", 9);
        let kinds = [
            Emotion::Sad,
            Emotion::Angry,
            Emotion::Fear,
            Emotion::Disgust,
            Emotion::Sad,
            Emotion::Happy,
            Emotion::Angry,
            Emotion::Fear,
            Emotion::Happy,
            Emotion::Disgust,
        ];
        for (i, &emotion) in kinds.iter().enumerate() {
            session.emotion_data.push(EmotionSample::new(
                session.start_time + Duration::seconds(3 * i as i64),
                emotion,
                0.9,
                0.5,
            ));
        }

        let factors = RiskScorer::factors(&session);
        assert!((factors.emotional_stability - 20.0).abs() < 1e-9);
        assert_eq!(factors.voice_sentiment, 100.0);
        assert_eq!(factors.behavioral_patterns, 75.0);
        assert!((compute_risk_score(&session) - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_scenario_severe_session() {
        let mut session = scenario_session("b", 9);
        session.risk_score = 90.0;

        assert_eq!(classify_severity(session.risk_score).level, SeverityLevel::Severe);
        let alerts = generate_alerts(&[session]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::Critical);
    }

    #[test]
    fn test_scenario_high_risk_session() {
        let mut session = scenario_session("c", 9);
        session.risk_score = 72.0;

        let alerts = generate_alerts(&[session]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::HighRisk);
    }

    #[test]
    fn test_scenario_voice_sentiment_threshold() {
        let build = |id: &str, negative: usize| {
            let mut session = scenario_session(id, 9);
            for i in 0..5 {
                let sentiment = if i < negative {
                    Sentiment::Negative
                } else {
                    Sentiment::Positive
                };
                session.voice_data.push(VoiceSample::new(
                    session.start_time + Duration::seconds(30 * i as i64),
                    "...",
                    sentiment,
                    0.8,
                    0.3,
                ));
            }
            session
        };

        let alerts = generate_alerts(&[build("d1", 4)]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::BehavioralChange);

        assert!(generate_alerts(&[build("d2", 3)]).is_empty());
    }

    #[test]
    fn test_scenario_repeated_generation() {
        let mut first = scenario_session("e1", 8);
        first.risk_score = 88.0;
        let mut second = scenario_session("e2", 9);
        second.risk_score = 73.0;
        let third = scenario_session("e3", 10);
        let sessions = vec![first, second, third];

        let run_one = generate_alerts(&sessions);
        let run_two = generate_alerts(&sessions);
        assert_eq!(run_one.len(), run_two.len());

        let mut ids_one: Vec<_> = run_one.iter().map(|a| a.id.clone()).collect();
        let mut ids_two: Vec<_> = run_two.iter().map(|a| a.id.clone()).collect();
        ids_one.sort();
        ids_two.sort();
        assert_eq!(ids_one, ids_two);

        ids_one.dedup();
        assert_eq!(ids_one.len(), run_one.len());
    }
}
