use crate::core::Trajectory;
use crate::playback::PlaybackState;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Playback engine for a single trajectory
///
/// Turns wall-clock time into the playback fraction `t`. Time is always passed in so the engine can be
/// driven by any ticker (and by paused time in tests).
pub struct PlaybackEngine {
    trajectory: Arc<Trajectory>,
    duration: Duration,
    state: PlaybackState,
    started_at: Option<Instant>,
    fraction: f64,
}

impl PlaybackEngine {
    pub fn new(trajectory: Arc<Trajectory>, duration: Duration) -> Self {
        Self {
            trajectory,
            duration,
            state: PlaybackState::Stopped,
            started_at: None,
            fraction: 0.0,
        }
    }

    pub fn trajectory(&self) -> &Arc<Trajectory> {
        &self.trajectory
    }

    /// Current playback fraction in [0, 1]
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Start playback from the beginning at `now`
    pub fn play(&mut self, now: Instant) {
        self.state = PlaybackState::Playing;
        self.started_at = Some(now);
        self.fraction = 0.0;
    }

    pub fn is_finished(&self) -> bool {
        self.state == PlaybackState::Finished
    }

    /// Update playback state (call each tick), returns the new fraction
    pub fn update(&mut self, now: Instant) -> f64 {
        if self.state != PlaybackState::Playing {
            return self.fraction;
        }

        if let Some(started_at) = self.started_at {
            let fraction = fraction_at(now.saturating_duration_since(started_at), self.duration);
            // Never step backwards even if the clock does
            self.fraction = fraction.max(self.fraction);

            if self.fraction >= 1.0 {
                self.state = PlaybackState::Finished;
            }
        }

        self.fraction
    }
}

/// Normalized elapsed time, capped at 1. A zero duration is already done.
pub fn fraction_at(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
}
