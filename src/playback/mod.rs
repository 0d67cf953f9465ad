pub mod driver;
pub mod engine;
pub mod session;

pub use driver::{SessionDriver, SessionEvent};
pub use engine::PlaybackEngine;
pub use session::{Session, SessionError};

use std::time::Duration;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Finished,
}

/// Lifecycle of one recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    LoadingTrajectory,
    CountingDown,
    Playing,
    Finished,
    Uploading,
    Submitted,
    Failed,
}

impl SessionPhase {
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Idle",
            SessionPhase::LoadingTrajectory => "Loading trajectory",
            SessionPhase::CountingDown => "Get ready",
            SessionPhase::Playing => "Recording",
            SessionPhase::Finished => "Finished",
            SessionPhase::Uploading => "Uploading",
            SessionPhase::Submitted => "Submitted",
            SessionPhase::Failed => "Failed",
        }
    }

    /// Whether a session in this phase is still running
    pub fn is_active(&self) -> bool {
        !matches!(self, SessionPhase::Idle | SessionPhase::Submitted | SessionPhase::Failed)
    }

    /// Whether the driver still honours a cancel request in this phase
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            SessionPhase::LoadingTrajectory | SessionPhase::CountingDown | SessionPhase::Playing
        )
    }
}

/// Playback configuration
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Time to traverse the whole trajectory
    pub duration: Duration,
    /// Countdown before playback (and recording) starts
    pub countdown: Duration,
    /// Ticks per second while playing
    pub tick_rate: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(10),
            countdown: Duration::from_secs(3),
            tick_rate: 60,
        }
    }
}

impl PlaybackConfig {
    /// Interval between two ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellable_phases() {
        assert!(SessionPhase::CountingDown.is_cancellable());
        assert!(SessionPhase::Playing.is_cancellable());
        // Recording is already stopped once playback ends
        assert!(!SessionPhase::Finished.is_cancellable());
        assert!(!SessionPhase::Uploading.is_cancellable());
        assert!(!SessionPhase::Idle.is_cancellable());
        assert!(SessionPhase::Uploading.is_active());
    }
}
