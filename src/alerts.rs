//! Alert generation
//!
//! Scans a set of sessions and raises therapist alerts. Rules are evaluated
//! independently per session:
//!
//! 1. risk score above the critical threshold → `critical`
//! 2. otherwise, risk score above the high-risk threshold → `high_risk`
//! 3. negative emotions above 70% of all emotion samples → `behavioral_change`
//! 4. negative voice samples above 60% of all voice samples → `behavioral_change`
//!
//! Alert ids depend only on the rule and the session id, so regenerating from
//! an unchanged session list yields the same ids.

use std::collections::HashSet;

use tracing::debug;

use crate::aggregator::{count_negative_emotions, count_sentiment};
use crate::config::{AlertThresholds, RiskConfig};
use crate::types::{Alert, AlertSeverity, AlertType, Sentiment, Session};

/// Alert generator over a therapist's visible sessions
pub struct AlertGenerator<'a> {
    thresholds: &'a AlertThresholds,
}

impl<'a> AlertGenerator<'a> {
    pub fn new(thresholds: &'a AlertThresholds) -> Self {
        Self { thresholds }
    }

    /// Generate alerts for all sessions, newest first, deduplicated by id
    pub fn generate(&self, sessions: &[Session]) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = sessions
            .iter()
            .flat_map(|session| self.evaluate(session))
            .collect();

        let mut seen = HashSet::new();
        alerts.retain(|alert| seen.insert(alert.id.clone()));

        // Stable sort keeps input order for equal timestamps
        alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        debug!(
            sessions = sessions.len(),
            alerts = alerts.len(),
            "generated therapist alerts"
        );
        alerts
    }

    /// Evaluate every rule against a single session
    pub fn evaluate(&self, session: &Session) -> Vec<Alert> {
        let mut alerts = Vec::new();
        let patient = patient_suffix(&session.patient_id);
        let score = session.risk_score.round();

        if session.risk_score > self.thresholds.critical_threshold {
            alerts.push(build_alert(
                session,
                "risk",
                AlertType::Critical,
                AlertSeverity::Critical,
                "Critical Risk Level Detected",
                format!(
                    "Patient {patient} shows risk score of {score}%. Immediate attention required."
                ),
            ));
        } else if session.risk_score > self.thresholds.high_risk_threshold {
            alerts.push(build_alert(
                session,
                "risk",
                AlertType::HighRisk,
                AlertSeverity::High,
                "High Risk Score Alert",
                format!("Patient {patient} shows elevated risk score of {score}%."),
            ));
        }

        let emotion_total = session.emotion_data.len();
        let negative_emotions = count_negative_emotions(&session.emotion_data);
        if exceeds_ratio(negative_emotions, emotion_total, self.thresholds.negative_emotion_ratio) {
            let pct = (negative_emotions as f64 / emotion_total as f64 * 100.0).round();
            alerts.push(build_alert(
                session,
                "behavior",
                AlertType::BehavioralChange,
                AlertSeverity::Medium,
                "Concerning Emotional Pattern",
                format!("Patient {patient} showing predominantly negative emotions ({pct}%)."),
            ));
        }

        let negative_voice = count_sentiment(&session.voice_data, Sentiment::Negative);
        if exceeds_ratio(
            negative_voice,
            session.voice_data.len(),
            self.thresholds.negative_voice_ratio,
        ) {
            alerts.push(build_alert(
                session,
                "voice",
                AlertType::BehavioralChange,
                AlertSeverity::Medium,
                "Negative Voice Sentiment",
                format!(
                    "Patient {patient} expressing predominantly negative sentiment in voice interactions."
                ),
            ));
        }

        alerts
    }
}

/// Generate alerts with the default thresholds
pub fn generate_alerts(sessions: &[Session]) -> Vec<Alert> {
    AlertGenerator::new(&AlertThresholds::default()).generate(sessions)
}

/// Generate alerts with the thresholds from `config`
pub fn generate_alerts_with_config(sessions: &[Session], config: &RiskConfig) -> Vec<Alert> {
    AlertGenerator::new(&config.alerts).generate(sessions)
}

/// Strict `count > total * ratio`; never fires for an empty total
fn exceeds_ratio(count: usize, total: usize, ratio: f64) -> bool {
    total > 0 && count as f64 > total as f64 * ratio
}

/// Last four characters of a patient id
fn patient_suffix(patient_id: &str) -> &str {
    let start = patient_id
        .char_indices()
        .rev()
        .nth(3)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &patient_id[start..]
}

fn build_alert(
    session: &Session,
    rule: &str,
    alert_type: AlertType,
    severity: AlertSeverity,
    title: &str,
    message: String,
) -> Alert {
    Alert {
        id: format!("{rule}-{}", session.id),
        patient_id: session.patient_id.clone(),
        alert_type,
        severity,
        title: title.to_string(),
        message,
        timestamp: session.last_activity(),
        is_read: false,
        session_id: Some(session.id.clone()),
    }
}
