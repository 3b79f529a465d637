//! Error types for MindBridge Risk

use thiserror::Error;

/// Errors raised at the boundaries of the risk pipeline.
///
/// The scoring, classification and alerting functions themselves are total;
/// these errors only come from parsing, validation, configuration and
/// recorder misuse.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No session is currently being recorded")]
    SessionNotActive,

    #[error("A session is already being recorded: {0}")]
    SessionAlreadyActive(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
