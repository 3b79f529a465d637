//! MindBridge Risk - Risk scoring and alerting for emotion and voice monitoring
//!
//! MindBridge Risk turns the emotion and voice observations collected during a
//! monitoring session into clinical signals through a deterministic pipeline:
//! observation aggregation → risk scoring → severity classification, with
//! alert generation running over the resulting sessions.
//!
//! ## Modules
//!
//! - **Recording**: Build a session sample by sample and finalize its risk score
//! - **Analysis**: Whole-session reports and per-patient risk trends
//! - **Alerting**: Therapist alerts for risky sessions and behavioral changes

pub mod aggregator;
pub mod alerts;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod recorder;
pub mod report;
pub mod scorer;
pub mod severity;
pub mod trends;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use aggregator::{LiveRatios, ObservationAggregator, ReportMetrics};
pub use alerts::{generate_alerts, generate_alerts_with_config, AlertGenerator};
pub use config::{AlertThresholds, RiskConfig};
pub use error::RiskError;
pub use pipeline::{
    alerts_json, patient_summaries_json, session_report_json, session_risk_score, RiskProcessor,
};
pub use recorder::SessionRecorder;
pub use report::SessionReport;
pub use scorer::{compute_risk_score, compute_risk_score_with_config, RiskScorer};
pub use severity::{classify_severity, RiskLevel, SeverityAssessment, SeverityLevel};
pub use trends::{summarize_patients, PatientRiskSummary};
pub use types::{
    Alert, AlertSeverity, AlertType, Emotion, EmotionSample, RiskFactors, Sentiment, Session,
    VoiceSample,
};

/// Crate version
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "mindbridge-risk";
