//! Session recording
//!
//! Holds the state of the session currently being recorded. A recorder is an
//! ordinary value owned by the caller; sample producers (camera sampling
//! timers, voice transcription) push observations through
//! [`SessionRecorder::append_emotion`] and [`SessionRecorder::append_voice`] at
//! whatever cadence they run.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::RiskConfig;
use crate::error::RiskError;
use crate::scorer::RiskScorer;
use crate::types::{EmotionSample, RiskFactors, Session, VoiceSample};

/// Recorder for a single patient's monitoring session
#[derive(Debug, Clone, Default)]
pub struct SessionRecorder {
    active: Option<Session>,
    config: RiskConfig,
}

impl SessionRecorder {
    /// Create an idle recorder with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an idle recorder with a custom configuration
    pub fn with_config(config: RiskConfig) -> Self {
        Self {
            active: None,
            config,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// The session being recorded, if any
    pub fn current(&self) -> Option<&Session> {
        self.active.as_ref()
    }

    /// Start a new empty session for `patient_id`
    pub fn start(&mut self, patient_id: &str, at: DateTime<Utc>) -> Result<&Session, RiskError> {
        if let Some(active) = &self.active {
            return Err(RiskError::SessionAlreadyActive(active.id.clone()));
        }
        if patient_id.trim().is_empty() {
            return Err(RiskError::InvalidSession("patient id is empty".to_string()));
        }

        let session = Session::new(Uuid::new_v4().to_string(), patient_id, at);
        debug!(session_id = %session.id, patient_id, "session started");
        Ok(self.active.insert(session))
    }

    /// Attach the reviewing therapist to the active session
    pub fn assign_therapist(&mut self, therapist_id: &str) -> Result<(), RiskError> {
        let session = self.active.as_mut().ok_or(RiskError::SessionNotActive)?;
        session.therapist_id = Some(therapist_id.to_string());
        Ok(())
    }

    /// Set free-text notes on the active session
    pub fn set_notes(&mut self, notes: &str) -> Result<(), RiskError> {
        let session = self.active.as_mut().ok_or(RiskError::SessionNotActive)?;
        session.notes = Some(notes.to_string());
        Ok(())
    }

    /// Append an emotion observation to the active session
    pub fn append_emotion(&mut self, sample: EmotionSample) -> Result<(), RiskError> {
        let session = self.active.as_mut().ok_or(RiskError::SessionNotActive)?;
        if let Err(e) = sample.validate() {
            warn!(session_id = %session.id, error = %e, "rejected emotion sample");
            return Err(e);
        }
        session.emotion_data.push(sample);
        Ok(())
    }

    /// Append a voice observation to the active session
    pub fn append_voice(&mut self, sample: VoiceSample) -> Result<(), RiskError> {
        let session = self.active.as_mut().ok_or(RiskError::SessionNotActive)?;
        if let Err(e) = sample.validate() {
            warn!(session_id = %session.id, error = %e, "rejected voice sample");
            return Err(e);
        }
        session.voice_data.push(sample);
        Ok(())
    }

    /// Running risk estimate over the trailing windows; zeros while idle
    pub fn live_risk_factors(&self) -> RiskFactors {
        self.active
            .as_ref()
            .map(|session| RiskScorer::factors_with_config(session, &self.config))
            .unwrap_or_default()
    }

    /// Finalize the active session with its end time and risk score
    ///
    /// The recorder is idle again afterwards.
    pub fn end(&mut self, at: DateTime<Utc>) -> Result<Session, RiskError> {
        let mut session = self.active.take().ok_or(RiskError::SessionNotActive)?;

        session.end_time = Some(at.max(session.start_time));
        session.risk_score = RiskScorer::factors_with_config(&session, &self.config).overall_risk;

        info!(
            session_id = %session.id,
            patient_id = %session.patient_id,
            emotion_samples = session.emotion_data.len(),
            voice_samples = session.voice_data.len(),
            risk_score = session.risk_score,
            "session ended"
        );
        Ok(session)
    }

    /// Abandon the active session without finalizing it
    pub fn discard(&mut self) -> Option<Session> {
        let session = self.active.take();
        if let Some(session) = &session {
            debug!(session_id = %session.id, "session discarded");
        }
        session
    }
}
