use async_trait::async_trait;
use crate::capture::{CaptureError, CaptureResult, Recorder, Recording};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Recorder without a capture device
///
/// Tracks start/stop like a real recorder and returns whatever payload it
/// was given. Used when no camera backend is available, and in tests.
pub struct MockRecorder {
    name: String,
    started_at: Option<Instant>,
    payload: Vec<u8>,
    starts: usize,
    stops: usize,
    fail_on_start: Option<String>,
}

impl MockRecorder {
    /// Create a new mock recorder
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            started_at: None,
            payload: Vec::new(),
            starts: 0,
            stops: 0,
            fail_on_start: None,
        }
    }

    /// Bytes returned as the encoded video on stop
    #[cfg(test)]
    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Make the next `start` fail with a device error
    #[cfg(test)]
    pub fn fail_on_start(mut self, message: &str) -> Self {
        self.fail_on_start = Some(message.to_string());
        self
    }

    /// Number of successful starts
    #[cfg(test)]
    pub fn starts(&self) -> usize {
        self.starts
    }

    /// Number of successful stops
    #[cfg(test)]
    pub fn stops(&self) -> usize {
        self.stops
    }
}

#[async_trait]
impl Recorder for MockRecorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_recording(&self) -> bool {
        self.started_at.is_some()
    }

    async fn start(&mut self) -> CaptureResult<()> {
        if let Some(message) = self.fail_on_start.take() {
            return Err(CaptureError::Device(message));
        }
        if self.started_at.is_some() {
            return Err(CaptureError::AlreadyRecording);
        }
        if self.payload.is_empty() {
            warn!("{}: no capture device, recording will be empty", self.name);
        }
        self.started_at = Some(Instant::now());
        self.starts += 1;
        debug!("{}: recording #{} started", self.name, self.starts);
        Ok(())
    }

    async fn stop(&mut self) -> CaptureResult<Recording> {
        let started_at = self.started_at.take().ok_or(CaptureError::NotRecording)?;
        self.stops += 1;
        let duration = started_at.elapsed();
        debug!("{}: recording #{} stopped after {:.2}s", self.name, self.stops, duration.as_secs_f64());

        Ok(Recording {
            file_name: "recording.webm".to_string(),
            mime_type: "video/webm".to_string(),
            bytes: self.payload.clone(),
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_mock_recorder_start_stop() {
        let mut recorder = MockRecorder::new("test").with_payload(vec![1, 2, 3]);
        assert!(!recorder.is_recording());

        recorder.start().await.unwrap();
        assert!(recorder.is_recording());

        let recording = recorder.stop().await.unwrap();
        assert!(!recorder.is_recording());
        assert_eq!(recording.bytes, vec![1, 2, 3]);
        assert_eq!(recording.mime_type, "video/webm");
        assert_eq!((recorder.starts(), recorder.stops()), (1, 1));
    }

    #[tokio::test]
    async fn test_mock_recorder_misuse() {
        let mut recorder = MockRecorder::new("test");
        assert!(matches!(recorder.stop().await, Err(CaptureError::NotRecording)));

        recorder.start().await.unwrap();
        assert!(matches!(recorder.start().await, Err(CaptureError::AlreadyRecording)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_recorder_measures_duration() {
        let mut recorder = MockRecorder::new("test");
        recorder.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(4)).await;
        let recording = recorder.stop().await.unwrap();
        assert_eq!(recording.duration, Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_mock_recorder_device_failure() {
        let mut recorder = MockRecorder::new("test").fail_on_start("camera denied");
        assert!(matches!(recorder.start().await, Err(CaptureError::Device(_))));
        // The failure is one-shot
        recorder.start().await.unwrap();
    }
}
