use crate::core::Trajectory;
use crate::playback::{PlaybackEngine, SessionPhase};
use crate::service::AnalysisReceipt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub use crate::error::SessionError;

/// One recording session: identifier, loaded trajectory, playback
/// progress and lifecycle phase.
///
/// Owned by whoever drives the session; transitions that arrive out of
/// order are rejected instead of silently applied.
pub struct Session {
    username: String,
    phase: SessionPhase,
    engine: Option<PlaybackEngine>,
    receipt: Option<AnalysisReceipt>,
    error: Option<String>,
}

impl Session {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            phase: SessionPhase::Idle,
            engine: None,
            receipt: None,
            error: None,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Current playback fraction, 0 before playback starts
    pub fn fraction(&self) -> f64 {
        self.engine.as_ref().map(|e| e.fraction()).unwrap_or(0.0)
    }

    pub fn trajectory(&self) -> Option<&Arc<Trajectory>> {
        self.engine.as_ref().map(|e| e.trajectory())
    }

    pub fn receipt(&self) -> Option<&AnalysisReceipt> {
        self.receipt.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn transition(&mut self, allowed_from: &[SessionPhase], to: SessionPhase) -> Result<(), SessionError> {
        if !allowed_from.contains(&self.phase) {
            return Err(SessionError::InvalidTransition { from: self.phase, to });
        }
        self.phase = to;
        Ok(())
    }

    pub fn begin_loading(&mut self) -> Result<(), SessionError> {
        self.transition(&[SessionPhase::Idle], SessionPhase::LoadingTrajectory)?;
        self.engine = None;
        self.receipt = None;
        self.error = None;
        Ok(())
    }

    /// Store the fetched trajectory and enter the countdown
    pub fn trajectory_loaded(&mut self, trajectory: Arc<Trajectory>, duration: Duration) -> Result<(), SessionError> {
        self.transition(&[SessionPhase::LoadingTrajectory], SessionPhase::CountingDown)?;
        self.engine = Some(PlaybackEngine::new(trajectory, duration));
        Ok(())
    }

    pub fn start_playback(&mut self, now: Instant) -> Result<(), SessionError> {
        self.transition(&[SessionPhase::CountingDown], SessionPhase::Playing)?;
        if let Some(engine) = self.engine.as_mut() {
            engine.play(now);
        }
        Ok(())
    }

    /// Advance playback to `now`; moves to Finished once `t` reaches 1
    pub fn tick(&mut self, now: Instant) -> Result<f64, SessionError> {
        if self.phase != SessionPhase::Playing {
            return Err(SessionError::InvalidTransition {
                from: self.phase,
                to: SessionPhase::Playing,
            });
        }

        let (fraction, finished) = match self.engine.as_mut() {
            Some(engine) => (engine.update(now), engine.is_finished()),
            None => (1.0, true),
        };

        if finished {
            self.phase = SessionPhase::Finished;
        }
        Ok(fraction)
    }

    pub fn begin_upload(&mut self) -> Result<(), SessionError> {
        self.transition(&[SessionPhase::Finished], SessionPhase::Uploading)
    }

    pub fn submitted(&mut self, receipt: AnalysisReceipt) -> Result<(), SessionError> {
        self.transition(&[SessionPhase::Uploading], SessionPhase::Submitted)?;
        self.receipt = Some(receipt);
        Ok(())
    }

    /// Record a failure; only running sessions can fail
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), SessionError> {
        if !self.phase.is_active() {
            return Err(SessionError::InvalidTransition {
                from: self.phase,
                to: SessionPhase::Failed,
            });
        }
        self.phase = SessionPhase::Failed;
        self.error = Some(message.into());
        Ok(())
    }

    /// Abandon the session and drop the trajectory
    pub fn cancel(&mut self) {
        self.phase = SessionPhase::Idle;
        self.engine = None;
    }

    /// Trajectory as submitted for analysis: `{"trajectory": [...]}`
    pub fn trajectory_json(&self) -> Result<String, SessionError> {
        let empty = Trajectory::default();
        let trajectory = self.trajectory().map(|t| t.as_ref()).unwrap_or(&empty);
        Ok(crate::service::wire::encode_trajectory(trajectory)?)
    }
}
