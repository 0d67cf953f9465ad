//! JSON bodies exchanged with the trajectory and analysis services

use crate::core::{Point, Trajectory};
use serde::{Deserialize, Serialize};

/// Playback trajectory body: `{"trajectory": [{"x":..,"y":..}, ...]}`
///
/// Other fields in the body are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryEnvelope {
    pub trajectory: Trajectory,
}

/// Generator output with coordinates normalized to [0, 1]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedTrajectory {
    pub trajectory_id: String,
    pub normalized_points: Vec<Point>,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl NormalizedTrajectory {
    /// Map unit coordinates onto [-1, 1] for playback
    pub fn to_centered(&self) -> Trajectory {
        self.normalized_points
            .iter()
            .map(|p| Point::new(p.x * 2.0 - 1.0, p.y * 2.0 - 1.0))
            .collect()
    }

    /// Fetch-trajectory response body carrying the centered points
    pub fn to_body(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&TrajectoryEnvelope { trajectory: self.to_centered() })
    }
}

/// Parse a fetch-trajectory response body
pub fn decode_trajectory(body: &[u8]) -> serde_json::Result<Trajectory> {
    serde_json::from_slice::<TrajectoryEnvelope>(body).map(|e| e.trajectory)
}

/// Serialize a trajectory the way it is echoed back with a submission
pub fn encode_trajectory(trajectory: &Trajectory) -> serde_json::Result<String> {
    #[derive(Serialize)]
    struct Borrowed<'a> {
        trajectory: &'a Trajectory,
    }
    serde_json::to_string(&Borrowed { trajectory })
}
