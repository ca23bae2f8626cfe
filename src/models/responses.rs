use serde::{Deserialize, Serialize};
use crate::core::scoring::ScoreBreakdown;
use crate::models::domain::{JobId, RankedWorker, WorkerId};

/// Response for the recommendations endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    #[serde(rename = "runId")]
    pub run_id: String,
    #[serde(rename = "jobId")]
    pub job_id: JobId,
    pub recommendations: Vec<RankedWorker>,
    pub relaxed: bool,
    #[serde(rename = "thresholdApplied")]
    pub threshold_applied: u32,
    #[serde(rename = "totalScored")]
    pub total_scored: usize,
}

/// Per-signal score of one worker for one job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    #[serde(rename = "workerId")]
    pub worker_id: WorkerId,
    #[serde(rename = "jobId")]
    pub job_id: JobId,
    #[serde(rename = "distanceKm")]
    pub distance_km: Option<f64>,
    #[serde(rename = "withinRadius")]
    pub within_radius: bool,
    pub breakdown: ScoreBreakdown,
    pub total: u32,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Record application response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordApplicationResponse {
    pub success: bool,
    #[serde(rename = "applicationId")]
    pub application_id: i64,
}
