use async_trait::async_trait;
use crate::core::Trajectory;
use crate::service::{AnalysisReceipt, AnalysisRequest, ServiceError, ServiceResult, TrajectoryService};
use std::sync::Mutex;

/// Mock service for testing without a backend
///
/// Serves a fixed trajectory and keeps every submission for inspection.
pub struct MockTrajectoryService {
    name: String,
    trajectory: Trajectory,
    submissions: Mutex<Vec<AnalysisRequest>>,
    fail_fetch: Option<String>,
    fail_submit: Option<String>,
}

impl MockTrajectoryService {
    /// Create a new mock service serving `trajectory`
    pub fn new(trajectory: Trajectory) -> Self {
        Self {
            name: "mock".to_string(),
            trajectory,
            submissions: Mutex::new(Vec::new()),
            fail_fetch: None,
            fail_submit: None,
        }
    }

    /// Make every fetch fail
    pub fn failing_fetch(mut self, message: &str) -> Self {
        self.fail_fetch = Some(message.to_string());
        self
    }

    /// Make every submission fail
    pub fn failing_submit(mut self, message: &str) -> Self {
        self.fail_submit = Some(message.to_string());
        self
    }

    /// Get all received submissions (for verification)
    pub fn take_submissions(&self) -> Vec<AnalysisRequest> {
        self.submissions
            .lock()
            .map(|mut s| s.drain(..).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TrajectoryService for MockTrajectoryService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_trajectory(&self) -> ServiceResult<Trajectory> {
        if let Some(message) = &self.fail_fetch {
            return Err(ServiceError::Unavailable(message.clone()));
        }
        Ok(self.trajectory.clone())
    }

    async fn submit_analysis(&self, request: AnalysisRequest) -> ServiceResult<AnalysisReceipt> {
        if let Some(message) = &self.fail_submit {
            return Err(ServiceError::Unavailable(message.clone()));
        }

        let mut submissions = self
            .submissions
            .lock()
            .map_err(|_| ServiceError::Unavailable("mock poisoned".to_string()))?;
        let client_id = format!("{}_{}", request.username, submissions.len());
        submissions.push(request);

        Ok(AnalysisReceipt {
            status: "success".to_string(),
            video_url: format!("mock://videos/{}", client_id),
            trajectory_url: format!("mock://trajectories/{}", client_id),
            client_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Recording;
    use crate::core::Point;
    use std::time::Duration;

    fn recording() -> Recording {
        Recording {
            file_name: "recording.webm".to_string(),
            mime_type: "video/webm".to_string(),
            bytes: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_mock_service_round() {
        let traj = Trajectory::new(vec![Point::new(1.0, 1.0)]);
        let service = MockTrajectoryService::new(traj.clone());
        assert_eq!(service.fetch_trajectory().await.unwrap(), traj);

        let receipt = service
            .submit_analysis(AnalysisRequest {
                video: recording(),
                trajectory: "{}".to_string(),
                username: "zed".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(receipt.client_id, "zed_0");

        let submissions = service.take_submissions();
        assert_eq!(submissions.len(), 1);
        assert!(service.take_submissions().is_empty());
    }

    #[tokio::test]
    async fn test_mock_service_failures() {
        let service = MockTrajectoryService::new(Trajectory::default())
            .failing_fetch("offline")
            .failing_submit("offline");
        assert!(matches!(service.fetch_trajectory().await, Err(ServiceError::Unavailable(_))));
    }
}
