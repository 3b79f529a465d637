//! Patient risk trends
//!
//! Summarizes a patient's session history for the therapist views: the
//! latest score and its change, recent-versus-older averages, pooled
//! observation ratios and high-risk session counts.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregator::{count_negative_emotions, count_sentiment};
use crate::severity::RiskLevel;
use crate::types::{Sentiment, Session};

/// Number of most recent sessions compared against the older history
pub const RECENT_SESSION_WINDOW: usize = 5;

/// Risk score strictly above this counts as a high-risk session
pub const HIGH_RISK_SESSION_SCORE: f64 = 70.0;

/// Risk score strictly above this counts as a critical session
pub const CRITICAL_SESSION_SCORE: f64 = 85.0;

/// Risk history summary for one patient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientRiskSummary {
    pub patient_id: String,
    pub session_count: usize,
    pub last_session_at: Option<DateTime<Utc>>,
    /// Risk score of the latest session (0 without sessions)
    pub current_risk: f64,
    /// Risk score of the session before the latest (current risk if none)
    pub previous_risk: f64,
    /// `current_risk - previous_risk`
    pub risk_trend: f64,
    pub average_risk: f64,
    /// Mean of the recent sessions minus mean of the older ones
    pub recent_trend: f64,
    pub high_risk_sessions: usize,
    pub critical_sessions: usize,
    /// Negative emotions across all sessions (0-100)
    pub emotional_instability: f64,
    /// Negative voice samples across all sessions (0-100)
    pub negative_voice_sentiment: f64,
    /// Ten points per high-risk session, capped at 100
    pub behavioral_concerns: f64,
    pub risk_level: RiskLevel,
}

impl PatientRiskSummary {
    /// Summarize sessions belonging to a single patient
    ///
    /// Sessions are ordered by start time before the trend is computed.
    pub fn from_sessions(patient_id: &str, sessions: &[&Session]) -> Self {
        let mut ordered: Vec<&Session> = sessions.to_vec();
        ordered.sort_by_key(|s| s.start_time);

        let scores: Vec<f64> = ordered.iter().map(|s| s.risk_score).collect();

        let current_risk = scores.last().copied().unwrap_or(0.0);
        let previous_risk = if scores.len() >= 2 {
            scores[scores.len() - 2]
        } else {
            current_risk
        };

        let split = scores.len().saturating_sub(RECENT_SESSION_WINDOW);
        let (older, recent) = scores.split_at(split);

        let high_risk_sessions = scores
            .iter()
            .filter(|&&s| s > HIGH_RISK_SESSION_SCORE)
            .count();
        let critical_sessions = scores
            .iter()
            .filter(|&&s| s > CRITICAL_SESSION_SCORE)
            .count();

        let (negative_emotions, total_emotions) = ordered.iter().fold((0, 0), |acc, s| {
            (
                acc.0 + count_negative_emotions(&s.emotion_data),
                acc.1 + s.emotion_data.len(),
            )
        });
        let (negative_voice, total_voice) = ordered.iter().fold((0, 0), |acc, s| {
            (
                acc.0 + count_sentiment(&s.voice_data, Sentiment::Negative),
                acc.1 + s.voice_data.len(),
            )
        });

        Self {
            patient_id: patient_id.to_string(),
            session_count: ordered.len(),
            last_session_at: ordered.iter().map(|s| s.start_time).max(),
            current_risk,
            previous_risk,
            risk_trend: current_risk - previous_risk,
            average_risk: mean(&scores),
            recent_trend: mean(recent) - mean(older),
            high_risk_sessions,
            critical_sessions,
            emotional_instability: pooled_pct(negative_emotions, total_emotions),
            negative_voice_sentiment: pooled_pct(negative_voice, total_voice),
            behavioral_concerns: ((high_risk_sessions * 10) as f64).min(100.0),
            risk_level: RiskLevel::from_score(current_risk),
        }
    }
}

/// Group sessions by patient and summarize each, most recently seen first
pub fn summarize_patients(sessions: &[Session]) -> Vec<PatientRiskSummary> {
    let mut by_patient: HashMap<&str, Vec<&Session>> = HashMap::new();
    for session in sessions {
        by_patient
            .entry(session.patient_id.as_str())
            .or_default()
            .push(session);
    }

    let mut summaries: Vec<PatientRiskSummary> = by_patient
        .into_iter()
        .map(|(patient_id, sessions)| PatientRiskSummary::from_sessions(patient_id, &sessions))
        .collect();

    summaries.sort_by(|a, b| {
        b.last_session_at
            .cmp(&a.last_session_at)
            .then_with(|| a.patient_id.cmp(&b.patient_id))
    });
    summaries
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percentage with the denominator floored at one
fn pooled_pct(count: usize, total: usize) -> f64 {
    (count as f64 / total.max(1) as f64 * 100.0).clamp(0.0, 100.0)
}
