use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::{Demographics, InteractionCounts, Job, Worker};
use crate::services::repository::WorkerRepository;

/// Composite score cap
pub const MAX_SCORE: u32 = 100;

pub const COLLABORATIVE_MAX: u32 = 50;
pub const COLLABORATIVE_BASELINE: u32 = 25;
pub const EXPERIENCE_MAX: u32 = 30;
pub const RELIABILITY_MAX: u32 = 20;
pub const RELIABILITY_BASELINE: u32 = 10;
pub const REPEAT_EMPLOYER_BONUS: u32 = 20;

/// Minimum weighted similarity for another worker to count as a neighbor
pub const NEIGHBOR_SIMILARITY_THRESHOLD: u32 = 3;

/// Weighted demographic similarity between two workers
///
/// experience within 2 years = 3, age within 5 years = 2, same gender = 1.
/// Missing age or experience compares as 0; a missing gender never matches.
pub fn similarity(candidate: &Demographics, other: &Demographics) -> u32 {
    let mut points = 0;

    let experience_gap = (i64::from(other.experience.unwrap_or(0)) - i64::from(candidate.experience.unwrap_or(0))).abs();
    if experience_gap <= 2 {
        points += 3;
    }

    let age_gap = (i64::from(other.age.unwrap_or(0)) - i64::from(candidate.age.unwrap_or(0))).abs();
    if age_gap <= 5 {
        points += 2;
    }

    if let (Some(a), Some(b)) = (&candidate.gender, &other.gender) {
        if a.eq_ignore_ascii_case(b) {
            points += 1;
        }
    }

    points
}

#[inline]
pub fn is_neighbor(candidate: &Demographics, other: &Demographics) -> bool {
    similarity(candidate, other) >= NEIGHBOR_SIMILARITY_THRESHOLD
}

/// Scale an acceptance rate to `max` points, `None` without history
#[inline]
fn acceptance_points(counts: InteractionCounts, max: u32) -> Option<u32> {
    counts
        .acceptance_rate()
        .map(|rate| (rate * max as f64).round() as u32)
}

/// Experience fit (0-30)
///
/// 1-5 years is the sweet spot; newcomers and veterans score a little lower.
#[inline]
pub fn experience_score(experience: Option<i32>) -> u32 {
    match experience {
        Some(1..=5) => 30,
        Some(0) => 25,
        Some(years) if years > 5 => 20,
        _ => 15,
    }
}

/// Per-signal contributions for one worker and job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub collaborative: u32,
    pub experience: u32,
    pub reliability: u32,
    #[serde(rename = "repeatEmployer")]
    pub repeat_employer: u32,
}

impl ScoreBreakdown {
    /// Capped composite score
    pub fn total(&self) -> u32 {
        (self.collaborative + self.experience + self.reliability + self.repeat_employer).min(MAX_SCORE)
    }
}

/// Signals the engine combines beyond the canonical three
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoringOptions {
    pub repeat_employer_bonus: bool,
}

/// Scores a worker for a job from their historical application data
///
/// Each signal degrades to its neutral baseline on a storage error, so one
/// failing query never aborts a run.
#[derive(Clone)]
pub struct ScoringEngine {
    repository: Arc<dyn WorkerRepository>,
    options: ScoringOptions,
}

impl ScoringEngine {
    pub fn new(repository: Arc<dyn WorkerRepository>, options: ScoringOptions) -> Self {
        Self { repository, options }
    }

    /// Calculate a score (0-100) for a worker and job
    pub async fn score(&self, worker: &Worker, job: &Job) -> u32 {
        self.breakdown(worker, job).await.total()
    }

    /// Calculate every signal for a worker and job, issuing queries concurrently
    pub async fn breakdown(&self, worker: &Worker, job: &Job) -> ScoreBreakdown {
        let (collaborative, reliability, repeat_employer) = tokio::join!(
            self.collaborative_score(worker),
            self.reliability_score(worker),
            self.repeat_employer_score(worker, job),
        );

        ScoreBreakdown {
            collaborative,
            experience: experience_score(worker.experience),
            reliability,
            repeat_employer,
        }
    }

    /// Demographic collaborative filtering (0-50)
    ///
    /// Acceptance rate across all applications of the worker's neighbors.
    pub async fn collaborative_score(&self, worker: &Worker) -> u32 {
        let counts = self
            .repository
            .count_neighbor_applications(
                worker.id,
                worker.experience,
                worker.age,
                worker.gender.as_deref(),
            )
            .await;

        match counts {
            Ok(counts) => acceptance_points(counts, COLLABORATIVE_MAX).unwrap_or(COLLABORATIVE_BASELINE),
            Err(e) => {
                tracing::warn!("Collaborative scoring failed for worker {}: {}", worker.id, e);
                COLLABORATIVE_BASELINE
            }
        }
    }

    /// Own acceptance rate (0-20)
    pub async fn reliability_score(&self, worker: &Worker) -> u32 {
        match self.repository.count_own_applications(worker.id).await {
            Ok(counts) => acceptance_points(counts, RELIABILITY_MAX).unwrap_or(RELIABILITY_BASELINE),
            Err(e) => {
                tracing::warn!("Reliability scoring failed for worker {}: {}", worker.id, e);
                RELIABILITY_BASELINE
            }
        }
    }

    /// Flat bonus for having worked for the job's employer before
    pub async fn repeat_employer_score(&self, worker: &Worker, job: &Job) -> u32 {
        if !self.options.repeat_employer_bonus {
            return 0;
        }
        let Some(employer_id) = job.employer_id else {
            return 0;
        };

        match self
            .repository
            .count_repeat_employer_acceptances(worker.id, employer_id)
            .await
        {
            Ok(count) if count > 0 => REPEAT_EMPLOYER_BONUS,
            Ok(_) => 0,
            Err(e) => {
                tracing::warn!(
                    "Repeat-employer scoring failed for worker {} and employer {}: {}",
                    worker.id,
                    employer_id,
                    e
                );
                0
            }
        }
    }
}

impl std::fmt::Debug for ScoringEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringEngine")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
