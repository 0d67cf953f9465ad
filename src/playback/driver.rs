use crate::capture::Recorder;
use crate::core::Trajectory;
use crate::playback::{PlaybackConfig, Session, SessionError, SessionPhase};
use crate::service::{AnalysisReceipt, AnalysisRequest, TrajectoryService};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Progress reported from the driver to the UI
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Phase(SessionPhase),
    TrajectoryLoaded(Arc<Trajectory>),
    /// Whole seconds left before playback starts
    Countdown(u64),
    /// New playback fraction
    Frame(f64),
    Submitted(AnalysisReceipt),
    Failed(String),
}

impl SessionEvent {
    /// Whether this is the last event the driver sends for a session
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            SessionEvent::Submitted(_) | SessionEvent::Failed(_) | SessionEvent::Phase(SessionPhase::Idle)
        )
    }
}

/// Runs one session end to end: fetch, countdown, timed playback while
/// recording, then submission.
///
/// Playback is an explicit loop on an interval ticker that ends once the
/// fraction reaches 1.
pub struct SessionDriver {
    config: PlaybackConfig,
    service: Arc<dyn TrajectoryService>,
    events: Sender<SessionEvent>,
    cancel: Arc<AtomicBool>,
}

impl SessionDriver {
    pub fn new(config: PlaybackConfig, service: Arc<dyn TrajectoryService>, events: Sender<SessionEvent>) -> Self {
        Self {
            config,
            service,
            events,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops the session at the next tick when set
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Run a full session for `username`
    ///
    /// On error or cancellation the recorder is stopped and its output
    /// dropped.
    pub async fn run(&self, username: &str, recorder: &mut dyn Recorder) -> Result<Session, SessionError> {
        let mut session = Session::new(username);

        match self.drive(&mut session, recorder).await {
            Ok(()) => Ok(session),
            Err(e) => {
                if recorder.is_recording() {
                    if let Err(stop_err) = recorder.stop().await {
                        warn!("Failed to stop recorder {}: {}", recorder.name(), stop_err);
                    }
                }

                if let SessionError::Cancelled = e {
                    info!("Session for {} cancelled while {}", session.username(), session.phase().label());
                    session.cancel();
                    self.emit(SessionEvent::Phase(SessionPhase::Idle));
                } else {
                    error!("Session for {} failed: {}", session.username(), e);
                    if session.fail(e.to_string()).is_ok() {
                        self.emit(SessionEvent::Phase(SessionPhase::Failed));
                    }
                    let message = session.error().map(str::to_string).unwrap_or_else(|| e.to_string());
                    self.emit(SessionEvent::Failed(message));
                }
                Err(e)
            }
        }
    }

    async fn drive(&self, session: &mut Session, recorder: &mut dyn Recorder) -> Result<(), SessionError> {
        session.begin_loading()?;
        self.emit(SessionEvent::Phase(SessionPhase::LoadingTrajectory));

        let trajectory = Arc::new(self.service.fetch_trajectory().await?);
        self.check_cancelled()?;
        info!("Loaded trajectory with {} points from {}", trajectory.len(), self.service.name());
        if trajectory.is_empty() {
            warn!("Trajectory is empty, playback shows no marker");
        }

        session.trajectory_loaded(trajectory.clone(), self.config.duration)?;
        self.emit(SessionEvent::TrajectoryLoaded(trajectory));
        self.emit(SessionEvent::Phase(SessionPhase::CountingDown));

        self.countdown().await?;

        recorder.start().await?;
        session.start_playback(Instant::now())?;
        self.emit(SessionEvent::Phase(SessionPhase::Playing));
        self.emit(SessionEvent::Frame(0.0));

        self.play(session).await?;
        debug!("Playback ended at t={:.3}", session.fraction());
        self.emit(SessionEvent::Phase(SessionPhase::Finished));

        let video = recorder.stop().await?;
        debug!(
            "Recorder {} produced {} bytes of {} ({:.1}s)",
            recorder.name(),
            video.bytes.len(),
            video.mime_type,
            video.duration.as_secs_f64()
        );

        session.begin_upload()?;
        self.emit(SessionEvent::Phase(SessionPhase::Uploading));

        let request = AnalysisRequest {
            video,
            trajectory: session.trajectory_json()?,
            username: session.username().to_string(),
        };
        let receipt = self.service.submit_analysis(request).await?;
        info!("Submission accepted as {}", receipt.client_id);

        session.submitted(receipt)?;
        self.emit(SessionEvent::Phase(SessionPhase::Submitted));
        if let Some(receipt) = session.receipt() {
            self.emit(SessionEvent::Submitted(receipt.clone()));
        }
        Ok(())
    }

    async fn countdown(&self) -> Result<(), SessionError> {
        let countdown = self.config.countdown;
        for remaining in (1..=countdown.as_secs()).rev() {
            self.emit(SessionEvent::Countdown(remaining));
            time::sleep(Duration::from_secs(1)).await;
            self.check_cancelled()?;
        }

        let rest = Duration::from_nanos(countdown.subsec_nanos() as u64);
        if !rest.is_zero() {
            time::sleep(rest).await;
            self.check_cancelled()?;
        }
        Ok(())
    }

    /// Tick until the playback fraction reaches 1
    async fn play(&self, session: &mut Session) -> Result<(), SessionError> {
        let mut ticker = time::interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.check_cancelled()?;

            let fraction = session.tick(Instant::now())?;
            self.emit(SessionEvent::Frame(fraction));

            if fraction >= 1.0 {
                return Ok(());
            }
        }
    }

    fn check_cancelled(&self) -> Result<(), SessionError> {
        if self.cancel.load(Ordering::SeqCst) {
            return Err(SessionError::Cancelled);
        }
        Ok(())
    }

    fn emit(&self, event: SessionEvent) {
        // The UI may already be gone; the session still completes
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MockRecorder;
    use crate::core::Point;
    use crate::service::MockTrajectoryService;
    use std::sync::mpsc::{channel, Receiver};

    fn config(duration_ms: u64, countdown_secs: u64) -> PlaybackConfig {
        PlaybackConfig {
            duration: Duration::from_millis(duration_ms),
            countdown: Duration::from_secs(countdown_secs),
            tick_rate: 10,
        }
    }

    fn trajectory() -> Trajectory {
        Trajectory::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)])
    }

    fn driver(
        config: PlaybackConfig,
        service: MockTrajectoryService,
    ) -> (SessionDriver, Arc<MockTrajectoryService>, Receiver<SessionEvent>) {
        let service = Arc::new(service);
        let (tx, rx) = channel();
        (SessionDriver::new(config, service.clone(), tx), service, rx)
    }

    fn phases(events: &[SessionEvent]) -> Vec<SessionPhase> {
        events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Phase(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    fn frames(events: &[SessionEvent]) -> Vec<f64> {
        events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Frame(t) => Some(*t),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_session() {
        let (driver, service, rx) = driver(config(1000, 3), MockTrajectoryService::new(trajectory()));
        let mut recorder = MockRecorder::new("cam").with_payload(vec![9, 9]);

        let session = driver.run("alice", &mut recorder).await.unwrap();
        assert_eq!(session.phase(), SessionPhase::Submitted);
        assert_eq!(session.fraction(), 1.0);

        let events: Vec<SessionEvent> = rx.try_iter().collect();
        assert_eq!(
            phases(&events),
            vec![
                SessionPhase::LoadingTrajectory,
                SessionPhase::CountingDown,
                SessionPhase::Playing,
                SessionPhase::Finished,
                SessionPhase::Uploading,
                SessionPhase::Submitted,
            ]
        );

        let countdown: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::Countdown(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert_eq!(countdown, vec![3, 2, 1]);

        let t = frames(&events);
        assert_eq!(t.first(), Some(&0.0));
        assert_eq!(t.last(), Some(&1.0));
        assert!(t.windows(2).all(|w| w[0] <= w[1]));
        // 1s at 10 ticks per second
        assert!(t.len() >= 10);

        assert_eq!((recorder.starts(), recorder.stops()), (1, 1));

        let submissions = service.take_submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].username, "alice");
        assert_eq!(submissions[0].video.bytes, vec![9, 9]);
        assert_eq!(
            submissions[0].trajectory,
            r#"{"trajectory":[{"x":0.0,"y":0.0},{"x":1.0,"y":0.0},{"x":1.0,"y":1.0}]}"#
        );
        assert!(matches!(events.last(), Some(SessionEvent::Submitted(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_playback_lasts_configured_duration() {
        let (driver, _service, _rx) = driver(config(2000, 0), MockTrajectoryService::new(trajectory()));
        let mut recorder = MockRecorder::new("cam");

        let start = Instant::now();
        driver.run("bob", &mut recorder).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fractional_countdown() {
        let config = PlaybackConfig {
            countdown: Duration::from_millis(1500),
            ..config(1000, 0)
        };
        let (driver, _service, rx) = driver(config, MockTrajectoryService::new(trajectory()));
        let mut recorder = MockRecorder::new("cam");

        let start = Instant::now();
        driver.run("hana", &mut recorder).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(2500));

        let countdown: Vec<u64> = rx
            .try_iter()
            .filter_map(|e| match e {
                SessionEvent::Countdown(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(countdown, vec![1]);
    }

    #[test]
    fn test_session_ending_events() {
        assert!(SessionEvent::Phase(SessionPhase::Idle).ends_session());
        assert!(SessionEvent::Failed("x".to_string()).ends_session());
        assert!(!SessionEvent::Phase(SessionPhase::Failed).ends_session());
        assert!(!SessionEvent::Countdown(1).ends_session());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_trajectory_still_completes() {
        let (driver, service, _rx) = driver(config(300, 0), MockTrajectoryService::new(Trajectory::default()));
        let mut recorder = MockRecorder::new("cam");

        let session = driver.run("carol", &mut recorder).await.unwrap();
        assert_eq!(session.phase(), SessionPhase::Submitted);
        assert_eq!(service.take_submissions()[0].trajectory, r#"{"trajectory":[]}"#);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure() {
        let (driver, _service, rx) =
            driver(config(1000, 1), MockTrajectoryService::new(trajectory()).failing_fetch("offline"));
        let mut recorder = MockRecorder::new("cam");

        let result = driver.run("dave", &mut recorder).await;
        assert!(matches!(result, Err(SessionError::Service(_))));
        assert_eq!(recorder.starts(), 0);

        let events: Vec<SessionEvent> = rx.try_iter().collect();
        assert_eq!(phases(&events), vec![SessionPhase::LoadingTrajectory, SessionPhase::Failed]);
        assert!(matches!(events.last(), Some(SessionEvent::Failed(m)) if m.contains("offline")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recorder_failure() {
        let (driver, service, _rx) = driver(config(1000, 0), MockTrajectoryService::new(trajectory()));
        let mut recorder = MockRecorder::new("cam").fail_on_start("permission denied");

        let result = driver.run("erin", &mut recorder).await;
        assert!(matches!(result, Err(SessionError::Capture(_))));
        assert!(service.take_submissions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_failure_after_recording() {
        let (driver, _service, rx) =
            driver(config(500, 0), MockTrajectoryService::new(trajectory()).failing_submit("503"));
        let mut recorder = MockRecorder::new("cam");

        assert!(driver.run("frank", &mut recorder).await.is_err());
        assert_eq!((recorder.starts(), recorder.stops()), (1, 1));

        let events: Vec<SessionEvent> = rx.try_iter().collect();
        assert_eq!(phases(&events).last(), Some(&SessionPhase::Failed));
        assert_eq!(frames(&events).last(), Some(&1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_playback() {
        let (driver, service, rx) = driver(config(5000, 0), MockTrajectoryService::new(trajectory()));
        let cancel = driver.cancel_handle();
        let mut recorder = MockRecorder::new("cam");

        tokio::spawn(async move {
            time::sleep(Duration::from_millis(1500)).await;
            cancel.store(true, Ordering::SeqCst);
        });

        let result = driver.run("gina", &mut recorder).await;
        assert!(matches!(result, Err(SessionError::Cancelled)));
        assert!(!recorder.is_recording());
        assert_eq!(recorder.stops(), 1);
        assert!(service.take_submissions().is_empty());

        let events: Vec<SessionEvent> = rx.try_iter().collect();
        assert_eq!(phases(&events).last(), Some(&SessionPhase::Idle));
        let last_t = *frames(&events).last().unwrap();
        assert!(last_t > 0.0 && last_t < 1.0);
    }
}
