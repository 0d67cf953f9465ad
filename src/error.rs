use crate::playback::SessionPhase;
use thiserror::Error;

/// Errors from the trajectory / analysis service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the media recorder
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("recorder is already running")]
    AlreadyRecording,

    #[error("recorder was not started")]
    NotRecording,

    #[error("capture device error: {0}")]
    Device(String),
}

/// Errors raised while driving a session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: SessionPhase, to: SessionPhase },

    #[error("session cancelled")]
    Cancelled,

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("failed to encode trajectory: {0}")]
    Encode(#[from] serde_json::Error),
}
