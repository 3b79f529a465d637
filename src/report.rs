//! Session analysis report
//!
//! Builds the retrospective view of a finished session: whole-session metrics,
//! both severity ladders, indicator tiers and key findings.

use serde::Serialize;

use crate::aggregator::{ObservationAggregator, ReportMetrics};
use crate::severity::{classify_severity, RiskLevel, SeverityAssessment};
use crate::types::{Emotion, EmotionSample, Session};

/// Traffic-light tier for a single report metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorTier {
    Ok,
    Warning,
    Danger,
}

impl IndicatorTier {
    /// Danger strictly above `danger`, warning strictly above `warning`
    fn from_thresholds(value: f64, danger: f64, warning: f64) -> Self {
        if value > danger {
            IndicatorTier::Danger
        } else if value > warning {
            IndicatorTier::Warning
        } else {
            IndicatorTier::Ok
        }
    }
}

/// Tier per report metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Indicators {
    pub emotional_negativity: IndicatorTier,
    pub voice_negativity: IndicatorTier,
    pub stress_level: IndicatorTier,
    pub emotional_variability: IndicatorTier,
}

impl Indicators {
    pub fn from_metrics(metrics: &ReportMetrics) -> Self {
        Self {
            emotional_negativity: IndicatorTier::from_thresholds(
                metrics.emotional_negativity_pct,
                60.0,
                30.0,
            ),
            voice_negativity: IndicatorTier::from_thresholds(metrics.voice_negativity_pct, 50.0, 25.0),
            stress_level: IndicatorTier::from_thresholds(metrics.avg_stress_level_pct, 70.0, 40.0),
            emotional_variability: IndicatorTier::from_thresholds(
                metrics.emotional_variability_pct,
                40.0,
                20.0,
            ),
        }
    }
}

/// Notable observation surfaced in the clinical summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// More than 60% of emotions were negative
    HighEmotionalNegativity { pct: f64 },
    /// Average vocal stress above 50%
    ElevatedStress { pct: f64 },
    /// More than 30% of emotions were positive
    PositiveIndicators { pct: f64 },
}

impl Finding {
    pub fn summary(&self) -> String {
        match self {
            Finding::HighEmotionalNegativity { pct } => {
                format!("{}% of emotions were negative", pct.round())
            }
            Finding::ElevatedStress { pct } => {
                format!("Average stress level of {}%", pct.round())
            }
            Finding::PositiveIndicators { pct } => {
                format!("{}% positive emotions detected", pct.round())
            }
        }
    }
}

/// Count and rounded share of one emotion within a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionShare {
    pub emotion: Emotion,
    pub count: usize,
    pub percentage: u32,
}

/// Full analysis of a single session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub session_id: String,
    pub patient_id: String,
    pub risk_score: f64,
    pub duration_sec: Option<i64>,
    pub emotion_samples: usize,
    pub voice_samples: usize,
    pub metrics: ReportMetrics,
    pub severity: SeverityAssessment,
    pub risk_level: RiskLevel,
    pub indicators: Indicators,
    pub findings: Vec<Finding>,
    pub emotion_distribution: Vec<EmotionShare>,
}

impl SessionReport {
    /// Analyze a session using every sample it holds
    pub fn build(session: &Session) -> Self {
        let metrics = ObservationAggregator::report(&session.emotion_data, &session.voice_data);

        Self {
            session_id: session.id.clone(),
            patient_id: session.patient_id.clone(),
            risk_score: session.risk_score,
            duration_sec: session.duration_secs(),
            emotion_samples: session.emotion_data.len(),
            voice_samples: session.voice_data.len(),
            metrics,
            severity: classify_severity(session.risk_score),
            risk_level: RiskLevel::from_score(session.risk_score),
            indicators: Indicators::from_metrics(&metrics),
            findings: key_findings(&metrics),
            emotion_distribution: emotion_distribution(&session.emotion_data),
        }
    }
}

fn key_findings(metrics: &ReportMetrics) -> Vec<Finding> {
    let mut findings = Vec::new();
    if metrics.emotional_negativity_pct > 60.0 {
        findings.push(Finding::HighEmotionalNegativity {
            pct: metrics.emotional_negativity_pct,
        });
    }
    if metrics.avg_stress_level_pct > 50.0 {
        findings.push(Finding::ElevatedStress {
            pct: metrics.avg_stress_level_pct,
        });
    }
    if metrics.positive_emotion_ratio_pct > 30.0 {
        findings.push(Finding::PositiveIndicators {
            pct: metrics.positive_emotion_ratio_pct,
        });
    }
    findings
}

/// Per-emotion counts, skipping emotions that never occurred
pub fn emotion_distribution(samples: &[EmotionSample]) -> Vec<EmotionShare> {
    let total = samples.len();
    if total == 0 {
        return Vec::new();
    }

    Emotion::ALL
        .iter()
        .filter_map(|&emotion| {
            let count = samples.iter().filter(|s| s.emotion == emotion).count();
            (count > 0).then(|| EmotionShare {
                emotion,
                count,
                percentage: (count as f64 / total as f64 * 100.0).round() as u32,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::SeverityLevel;
    use crate::types::{EmotionSample, Sentiment, VoiceSample};
    use chrono::{Duration, TimeZone, Utc};

    fn analysed_session() -> Session {
        let start = Utc.with_ymd_and_hms(2024, 4, 20, 16, 0, 0).unwrap();
        let mut session = Session::new("report-1", "patient-5521", start);
        let kinds = [
            Emotion::Sad,
            Emotion::Sad,
            Emotion::Fear,
            Emotion::Angry,
            Emotion::Sad,
            Emotion::Disgust,
            Emotion::Sad,
            Emotion::Happy,
            Emotion::Neutral,
            Emotion::Sad,
        ];
        for (i, &emotion) in kinds.iter().enumerate() {
            session.emotion_data.push(EmotionSample::new(
                start + Duration::seconds(3 * i as i64),
                emotion,
                0.8,
                0.5,
            ));
        }
        for (i, stress) in [0.5, 0.7].iter().enumerate() {
            session.voice_data.push(VoiceSample::new(
                start + Duration::seconds(60 * i as i64),
                "I haven't been sleeping",
                Sentiment::Negative,
                0.9,
                *stress,
            ));
        }
        session.end_time = Some(start + Duration::minutes(20));
        session.risk_score = 66.0;
        session
    }

    #[test]
    fn test_report_summary_fields() {
        let report = SessionReport::build(&analysed_session());

        assert_eq!(report.session_id, "report-1");
        assert_eq!(report.duration_sec, Some(1200));
        assert_eq!(report.emotion_samples, 10);
        assert_eq!(report.voice_samples, 2);
        assert_eq!(report.severity.level, SeverityLevel::ModerateSevere);
        assert_eq!(report.risk_level, RiskLevel::Moderate);
    }

    #[test]
    fn test_indicator_tiers() {
        let report = SessionReport::build(&analysed_session());

        // 8 of 10 negative, all voice negative, stress 60%
        assert_eq!(report.indicators.emotional_negativity, IndicatorTier::Danger);
        assert_eq!(report.indicators.voice_negativity, IndicatorTier::Danger);
        assert_eq!(report.indicators.stress_level, IndicatorTier::Warning);
        assert_eq!(report.indicators.emotional_variability, IndicatorTier::Ok);
    }

    #[test]
    fn test_key_findings() {
        let report = SessionReport::build(&analysed_session());

        assert_eq!(report.findings.len(), 2);
        assert!(matches!(report.findings[0], Finding::HighEmotionalNegativity { .. }));
        assert!(matches!(report.findings[1], Finding::ElevatedStress { .. }));
        assert_eq!(report.findings[0].summary(), "80% of emotions were negative");
    }

    #[test]
    fn test_emotion_distribution() {
        let report = SessionReport::build(&analysed_session());
        let sad = report
            .emotion_distribution
            .iter()
            .find(|share| share.emotion == Emotion::Sad)
            .unwrap();
        assert_eq!(sad.count, 5);
        assert_eq!(sad.percentage, 50);
        assert!(report
            .emotion_distribution
            .iter()
            .all(|share| share.emotion != Emotion::Surprised));
    }

    #[test]
    fn test_empty_session_report() {
        let start = Utc.with_ymd_and_hms(2024, 4, 20, 16, 0, 0).unwrap();
        let report = SessionReport::build(&Session::new("empty", "p", start));

        assert_eq!(report.metrics, ReportMetrics::default());
        assert!(report.findings.is_empty());
        assert!(report.emotion_distribution.is_empty());
        assert_eq!(report.duration_sec, None);
        assert_eq!(report.severity.level, SeverityLevel::Minimal);
    }

    #[test]
    fn test_report_serializes() {
        let report = SessionReport::build(&analysed_session());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["severity"]["level"], "moderate_severe");
        assert_eq!(value["risk_level"], "moderate");
        assert_eq!(value["findings"][0]["kind"], "high_emotional_negativity");
        assert_eq!(value["indicators"]["stress_level"], "warning");
    }
}
