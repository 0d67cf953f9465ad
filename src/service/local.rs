use async_trait::async_trait;
use crate::core::Trajectory;
use crate::service::generator::generate_unit_trajectory;
use crate::service::wire::decode_trajectory;
use crate::service::{AnalysisReceipt, AnalysisRequest, ServiceError, ServiceResult, TrajectoryService};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, info};

/// Accepted video container extensions
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm"];

/// In-process trajectory service
///
/// Generates reference trajectories locally and stores submissions under a
/// storage directory:
/// - `videos/<client_id>.<ext>`
/// - `trajectories/<client_id>.json`
pub struct LocalService {
    name: String,
    storage_dir: PathBuf,
    rng: Mutex<StdRng>,
    submissions: AtomicU64,
}

impl LocalService {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self::with_rng(storage_dir, StdRng::from_entropy())
    }

    /// Create a service with a fixed seed (reproducible trajectories)
    pub fn with_seed(storage_dir: impl Into<PathBuf>, seed: u64) -> Self {
        Self::with_rng(storage_dir, StdRng::seed_from_u64(seed))
    }

    fn with_rng(storage_dir: impl Into<PathBuf>, rng: StdRng) -> Self {
        Self {
            name: "local".to_string(),
            storage_dir: storage_dir.into(),
            rng: Mutex::new(rng),
            submissions: AtomicU64::new(0),
        }
    }

    fn next_client_id(&self, username: &str) -> String {
        let seq = self.submissions.fetch_add(1, Ordering::SeqCst);
        format!("{}_{}_{}", sanitize(username), Utc::now().format("%Y%m%d%H%M%S%3f"), seq)
    }
}

/// Trimmed identifier; empty identifiers are rejected
pub fn normalize_username(value: &str) -> ServiceResult<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidRequest("username must not be empty".to_string()));
    }
    Ok(trimmed)
}

/// Lowercased extension of an accepted video file name
pub fn video_extension(file_name: &str) -> ServiceResult<String> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext {
        Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => Ok(ext),
        _ => Err(ServiceError::InvalidRequest(format!("invalid video format: {}", file_name))),
    }
}

// Keep client ids usable as file names
fn sanitize(username: &str) -> String {
    username
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[async_trait]
impl TrajectoryService for LocalService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_trajectory(&self) -> ServiceResult<Trajectory> {
        let generated = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| ServiceError::Unavailable("trajectory generator poisoned".to_string()))?;
            generate_unit_trajectory(&mut *rng)
        };

        info!(
            "Generated {} trajectory {} with {} points",
            generated.parameters["trajectory_type"].as_str().unwrap_or("unknown"),
            generated.trajectory_id,
            generated.normalized_points.len()
        );

        // Same body a remote trajectory service answers with
        let body = generated.to_body()?;
        debug!("Trajectory body is {} bytes", body.len());
        Ok(decode_trajectory(&body)?)
    }

    async fn submit_analysis(&self, request: AnalysisRequest) -> ServiceResult<AnalysisReceipt> {
        let username = normalize_username(&request.username)?;
        let ext = video_extension(&request.video.file_name)?;

        // Re-encode to make sure the stored file is well-formed JSON
        let trajectory: serde_json::Value = serde_json::from_str(&request.trajectory)?;
        let trajectory = serde_json::to_vec(&trajectory)?;

        let client_id = self.next_client_id(username);
        let video_path = self.storage_dir.join("videos").join(format!("{}.{}", client_id, ext));
        let trajectory_path = self.storage_dir.join("trajectories").join(format!("{}.json", client_id));

        tokio::fs::create_dir_all(self.storage_dir.join("videos")).await?;
        tokio::fs::create_dir_all(self.storage_dir.join("trajectories")).await?;
        tokio::fs::write(&video_path, &request.video.bytes).await?;
        tokio::fs::write(&trajectory_path, &trajectory).await?;

        debug!("Stored {} video bytes at {}", request.video.bytes.len(), video_path.display());
        info!("Stored submission {} for {}", client_id, username);

        Ok(AnalysisReceipt {
            status: "success".to_string(),
            client_id,
            video_url: video_path.display().to_string(),
            trajectory_url: trajectory_path.display().to_string(),
        })
    }
}
