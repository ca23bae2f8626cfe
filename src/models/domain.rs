use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub type WorkerId = i64;
pub type JobId = i64;
pub type EmployerId = i64;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Build coordinates only when both components are present
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self { latitude, longitude }),
            _ => None,
        }
    }
}

/// Registered field worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub phone: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub experience: Option<i32>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Worker {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }

    pub fn demographics(&self) -> Demographics {
        Demographics {
            age: self.age,
            gender: self.gender.clone(),
            experience: self.experience,
        }
    }
}

/// Demographic attributes used for neighbor similarity
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Demographics {
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub experience: Option<i32>,
}

fn default_true() -> bool { true }

/// Job posted by an employer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Job {
    pub id: JobId,
    #[serde(default)]
    pub employer_id: Option<EmployerId>,
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default, alias = "address")]
    pub location: Option<String>,
    #[serde(default)]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[serde(default)]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub pay_rate: String,
    pub pay_type: String,
    #[serde(default)]
    pub transport_provided: bool,
    #[serde(default)]
    pub duration: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Job {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }
}

/// Worker response status for a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            other => Err(format!("unknown application status: {}", other)),
        }
    }
}

/// Append-only record of a worker's response to a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub worker_id: WorkerId,
    pub job_id: JobId,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

/// Application to be recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewApplication {
    pub worker_id: WorkerId,
    pub job_id: JobId,
    pub status: ApplicationStatus,
}

/// Aggregate of applications: how many, and how many were accepted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionCounts {
    pub total: u64,
    pub accepted: u64,
}

impl InteractionCounts {
    pub fn new(total: u64, accepted: u64) -> Self {
        Self { total, accepted }
    }

    /// Share of accepted applications, `None` without history
    pub fn acceptance_rate(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.accepted.min(self.total) as f64 / self.total as f64)
    }
}

/// Worker selected for a job, with the distance and score it was ranked by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedWorker {
    pub worker: Worker,
    #[serde(rename = "distanceKm")]
    pub distance_km: Option<f64>,
    pub score: u32,
}

/// Tunables for a single recommendation run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationParams {
    pub threshold: u32,
    pub max_distance_km: f64,
    pub max_workers: Option<usize>,
}

impl Default for RecommendationParams {
    fn default() -> Self {
        Self {
            threshold: 50,
            max_distance_km: 10.0,
            max_workers: None,
        }
    }
}

/// Outcome of a recommendation run, handed to the notification dispatcher
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub job: Job,
    pub workers: Vec<RankedWorker>,
    pub total_scored: usize,
    pub threshold_applied: u32,
    pub relaxed: bool,
}

impl Recommendation {
    pub fn empty(job: Job, threshold: u32) -> Self {
        Self {
            job,
            workers: Vec::new(),
            total_scored: 0,
            threshold_applied: threshold,
            relaxed: false,
        }
    }
}
