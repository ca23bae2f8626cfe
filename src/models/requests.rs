use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{Job, JobId, WorkerId};

/// Request to rank workers for a newly posted job
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendRequest {
    #[validate(nested)]
    pub job: Job,
    #[validate(range(max = 100))]
    #[serde(default)]
    pub threshold: Option<u32>,
    #[validate(range(min = 0.0))]
    #[serde(default, alias = "max_distance_km", rename = "maxDistanceKm")]
    pub max_distance_km: Option<f64>,
    #[validate(range(min = 1))]
    #[serde(default, alias = "max_workers", rename = "maxWorkers")]
    pub max_workers: Option<usize>,
}

/// Request to record a worker's response to a job
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordApplicationRequest {
    #[validate(range(min = 1))]
    #[serde(alias = "worker_id", rename = "workerId")]
    pub worker_id: WorkerId,
    #[validate(range(min = 1))]
    #[serde(alias = "job_id", rename = "jobId")]
    pub job_id: JobId,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "accepted".to_string()
}

/// Query for the per-signal score breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreQuery {
    #[serde(alias = "job_id", rename = "jobId")]
    pub job_id: JobId,
    #[serde(default, alias = "max_distance_km", rename = "maxDistanceKm")]
    pub max_distance_km: Option<f64>,
}
