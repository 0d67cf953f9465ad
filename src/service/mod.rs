pub mod generator;
pub mod local;
#[cfg(test)]
pub mod mock;
pub mod wire;

pub use local::LocalService;
#[cfg(test)]
pub use mock::MockTrajectoryService;

use async_trait::async_trait;
use crate::capture::Recording;
use crate::core::Trajectory;
use serde::{Deserialize, Serialize};

pub use crate::error::ServiceError;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Everything uploaded for one analysis
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub video: Recording,
    /// Trajectory serialized as `{"trajectory": [...]}`
    pub trajectory: String,
    /// Free-text identifier of the participant
    pub username: String,
}

/// Acknowledgement returned for a stored submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReceipt {
    pub status: String,
    pub client_id: String,
    pub video_url: String,
    pub trajectory_url: String,
}

/// Trait for trajectory and analysis backends
///
/// Implementations:
/// - In-process generator with local storage
/// - Mock service for testing
#[async_trait]
pub trait TrajectoryService: Send + Sync {
    /// Get the name/identifier of this service
    fn name(&self) -> &str;

    /// Fetch a fresh reference trajectory for playback
    async fn fetch_trajectory(&self) -> ServiceResult<Trajectory>;

    /// Upload a recording together with the trajectory it was made against
    async fn submit_analysis(&self, request: AnalysisRequest) -> ServiceResult<AnalysisReceipt>;
}
