pub mod mock;

pub use mock::MockRecorder;

use async_trait::async_trait;
use std::time::Duration;

pub use crate::error::CaptureError;

/// Result type for recorder operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Encoded media produced by a recorder
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    /// File name the media is uploaded under, e.g. `recording.webm`
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    /// Wall-clock length of the recording
    pub duration: Duration,
}

/// Trait for media capture backends
///
/// A recorder runs concurrently with playback: it is started when the
/// marker starts moving and stopped when playback reaches its end.
#[async_trait]
pub trait Recorder: Send {
    /// Get the name/identifier of this recorder
    fn name(&self) -> &str;

    /// Whether a recording is in progress
    fn is_recording(&self) -> bool;

    /// Begin capturing
    async fn start(&mut self) -> CaptureResult<()>;

    /// Stop capturing and hand back the encoded media
    async fn stop(&mut self) -> CaptureResult<Recording>;
}
