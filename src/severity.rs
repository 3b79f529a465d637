//! Severity classification
//!
//! Two independent ladders map a risk score to a category:
//! - [`SeverityLevel`]: five clinical tiers with guidance copy, used in
//!   session analysis.
//! - [`RiskLevel`]: a coarse three-tier badge used in lists and overviews.
//!
//! The ladders use different cut points and are not expected to agree.

use serde::{Deserialize, Serialize};

/// Clinical depression severity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    Minimal,
    Mild,
    Moderate,
    ModerateSevere,
    Severe,
}

/// Inclusive lower bounds, evaluated from the top down
const SEVERITY_LADDER: [(f64, SeverityLevel); 4] = [
    (85.0, SeverityLevel::Severe),
    (65.0, SeverityLevel::ModerateSevere),
    (45.0, SeverityLevel::Moderate),
    (25.0, SeverityLevel::Mild),
];

impl SeverityLevel {
    /// Classify a risk score; the first matching tier wins
    pub fn from_score(score: f64) -> Self {
        SEVERITY_LADDER
            .iter()
            .find(|(threshold, _)| score >= *threshold)
            .map(|(_, level)| *level)
            .unwrap_or(SeverityLevel::Minimal)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SeverityLevel::Severe => "Severe Depression",
            SeverityLevel::ModerateSevere => "Moderate-Severe Depression",
            SeverityLevel::Moderate => "Moderate Depression",
            SeverityLevel::Mild => "Mild Depression",
            SeverityLevel::Minimal => "Minimal/No Depression",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SeverityLevel::Severe => {
                "Significant symptoms requiring immediate professional intervention"
            }
            SeverityLevel::ModerateSevere => {
                "Substantial symptoms significantly impacting daily functioning"
            }
            SeverityLevel::Moderate => "Notable symptoms affecting mood and daily activities",
            SeverityLevel::Mild => "Some symptoms present but manageable with support",
            SeverityLevel::Minimal => "Few or no depressive symptoms detected",
        }
    }

    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            SeverityLevel::Severe => &[
                "Immediate psychiatric evaluation required",
                "Consider inpatient treatment options",
                "Daily monitoring and support",
                "Medication review with psychiatrist",
                "Crisis intervention plan activation",
            ],
            SeverityLevel::ModerateSevere => &[
                "Intensive outpatient therapy (2-3 sessions/week)",
                "Psychiatric consultation for medication",
                "Weekly progress monitoring",
                "Family/support system involvement",
                "Structured daily activity planning",
            ],
            SeverityLevel::Moderate => &[
                "Regular therapy sessions (weekly)",
                "Consider antidepressant medication",
                "Cognitive behavioral therapy (CBT)",
                "Exercise and lifestyle modifications",
                "Bi-weekly progress assessments",
            ],
            SeverityLevel::Mild => &[
                "Bi-weekly counseling sessions",
                "Mindfulness and stress reduction techniques",
                "Regular exercise routine",
                "Sleep hygiene improvement",
                "Social support network strengthening",
            ],
            SeverityLevel::Minimal => &[
                "Continue current coping strategies",
                "Maintain regular self-care routine",
                "Monthly check-ins for prevention",
                "Stress management techniques",
                "Healthy lifestyle maintenance",
            ],
        }
    }
}

/// Severity tier with its guidance copy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityAssessment {
    pub level: SeverityLevel,
    pub label: &'static str,
    pub description: &'static str,
    pub recommendations: &'static [&'static str],
}

/// Map a risk score to its clinical severity tier
pub fn classify_severity(score: f64) -> SeverityAssessment {
    let level = SeverityLevel::from_score(score);
    SeverityAssessment {
        level,
        label: level.label(),
        description: level.description(),
        recommendations: level.recommendations(),
    }
}

/// Coarse risk badge for list and overview views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Low below 30, Moderate below 70, High otherwise
    pub fn from_score(score: f64) -> Self {
        if score < 30.0 {
            RiskLevel::Low
        } else if score < 70.0 {
            RiskLevel::Moderate
        } else {
            RiskLevel::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        }
    }
}
