//! Core types for the MindBridge risk pipeline
//!
//! This module defines the records that flow through each stage: the raw
//! emotion and voice samples collected during a monitoring session, the
//! session itself, the derived risk factors and the alerts raised for
//! therapists.
//!
//! Field names serialize in camelCase so persisted sessions keep the shape the
//! patient portal stores them in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RiskError;

/// Facial emotion classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Surprised,
    Fear,
    Disgust,
    Neutral,
}

impl Emotion {
    /// Every emotion, in declaration order
    pub const ALL: [Emotion; 7] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Surprised,
        Emotion::Fear,
        Emotion::Disgust,
        Emotion::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Surprised => "surprised",
            Emotion::Fear => "fear",
            Emotion::Disgust => "disgust",
            Emotion::Neutral => "neutral",
        }
    }

    /// Sad, angry, fear and disgust
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            Emotion::Sad | Emotion::Angry | Emotion::Fear | Emotion::Disgust
        )
    }

    /// Happy and surprised
    pub fn is_positive(&self) -> bool {
        matches!(self, Emotion::Happy | Emotion::Surprised)
    }
}

/// Sentiment of a voice transcription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

/// A single facial emotion observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionSample {
    pub timestamp: DateTime<Utc>,
    pub emotion: Emotion,
    /// Classifier confidence (0-1)
    pub confidence: f64,
    /// Expression intensity (0-1)
    pub intensity: f64,
}

impl EmotionSample {
    pub fn new(timestamp: DateTime<Utc>, emotion: Emotion, confidence: f64, intensity: f64) -> Self {
        Self {
            timestamp,
            emotion,
            confidence,
            intensity,
        }
    }

    /// Check that confidence and intensity are finite values in [0, 1]
    pub fn validate(&self) -> Result<(), RiskError> {
        check_unit("emotion confidence", self.confidence)
            .map_err(RiskError::InvalidSample)?;
        check_unit("emotion intensity", self.intensity).map_err(RiskError::InvalidSample)
    }
}

/// A single transcribed voice observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSample {
    pub timestamp: DateTime<Utc>,
    pub transcription: String,
    pub sentiment: Sentiment,
    /// Sentiment confidence (0-1)
    pub confidence: f64,
    /// Detected vocal stress (0-1)
    pub stress_level: f64,
}

impl VoiceSample {
    pub fn new(
        timestamp: DateTime<Utc>,
        transcription: impl Into<String>,
        sentiment: Sentiment,
        confidence: f64,
        stress_level: f64,
    ) -> Self {
        Self {
            timestamp,
            transcription: transcription.into(),
            sentiment,
            confidence,
            stress_level,
        }
    }

    /// Check that confidence and stress level are finite values in [0, 1]
    pub fn validate(&self) -> Result<(), RiskError> {
        check_unit("voice confidence", self.confidence).map_err(RiskError::InvalidSample)?;
        check_unit("voice stress level", self.stress_level).map_err(RiskError::InvalidSample)
    }
}

fn check_unit(name: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{name} must be within [0, 1], got {value}"))
    }
}

/// One continuous patient monitoring interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub patient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub therapist_id: Option<String>,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub emotion_data: Vec<EmotionSample>,
    #[serde(default)]
    pub voice_data: Vec<VoiceSample>,
    /// Overall risk (0-100), populated when the session ends
    #[serde(default)]
    pub risk_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Session {
    /// Create an empty session with a zero risk score
    pub fn new(
        id: impl Into<String>,
        patient_id: impl Into<String>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            patient_id: patient_id.into(),
            therapist_id: None,
            start_time,
            end_time: None,
            emotion_data: Vec::new(),
            voice_data: Vec::new(),
            risk_score: 0.0,
            notes: None,
        }
    }

    /// End time if the session was finalized, start time otherwise
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.end_time.unwrap_or(self.start_time)
    }

    pub fn is_ended(&self) -> bool {
        self.end_time.is_some()
    }

    /// Session length in seconds, if the session has ended
    pub fn duration_secs(&self) -> Option<i64> {
        self.end_time
            .map(|end| (end - self.start_time).num_seconds())
    }

    /// Validate identifiers, timing, risk score and every sample
    pub fn validate(&self) -> Result<(), RiskError> {
        if self.id.trim().is_empty() {
            return Err(RiskError::InvalidSession("session id is empty".to_string()));
        }
        if self.patient_id.trim().is_empty() {
            return Err(RiskError::InvalidSession(format!(
                "session {} has an empty patient id",
                self.id
            )));
        }
        if let Some(end) = self.end_time {
            if end < self.start_time {
                return Err(RiskError::InvalidSession(format!(
                    "session {} ends before it starts",
                    self.id
                )));
            }
        }
        if !self.risk_score.is_finite() || !(0.0..=100.0).contains(&self.risk_score) {
            return Err(RiskError::InvalidSession(format!(
                "session {} has risk score {} outside [0, 100]",
                self.id, self.risk_score
            )));
        }
        for sample in &self.emotion_data {
            sample.validate()?;
        }
        for sample in &self.voice_data {
            sample.validate()?;
        }
        Ok(())
    }
}

/// Depression risk factors derived from a session's current samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactors {
    /// 100 minus the windowed negative emotion percentage (0-100)
    pub emotional_stability: f64,
    /// 100 minus the windowed negative voice percentage (0-100)
    pub voice_sentiment: f64,
    /// Fixed behavioral placeholder (0-100)
    pub behavioral_patterns: f64,
    /// 100 minus the mean of the three factors above (0-100)
    pub overall_risk: f64,
}

/// Alert category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Critical,
    HighRisk,
    BehavioralChange,
    MissedSession,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Critical => "critical",
            AlertType::HighRisk => "high_risk",
            AlertType::BehavioralChange => "behavioral_change",
            AlertType::MissedSession => "missed_session",
        }
    }
}

/// Alert urgency, ordered from least to most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        }
    }
}

/// A notice surfaced to a therapist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub patient_id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}
