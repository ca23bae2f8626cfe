use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use thiserror::Error;

use crate::core::{
    filters::{filter_by_radius, select_candidates},
    scoring::{ScoringEngine, ScoringOptions},
};
use crate::models::{Job, RankedWorker, Recommendation, RecommendationParams};
use crate::services::repository::{RepositoryError, WorkerRepository};

/// Default number of workers scored at the same time
pub const DEFAULT_SCORING_CONCURRENCY: usize = 16;

/// Conditions under which no recommendation can be produced
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Recommendation unavailable: {0}")]
    Unavailable(#[from] RepositoryError),

    #[error("Recommendation timed out after {0:?}")]
    TimedOut(Duration),
}

/// Selection policy - ranks active workers for a newly posted job
///
/// # Pipeline Stages
/// 1. Fetch active workers
/// 2. Radius filter (workers or jobs without coordinates are kept)
/// 3. Concurrent scoring
/// 4. Threshold selection and ranking
/// 5. Threshold relaxation when too few qualify
/// 6. Result-size cap
#[derive(Clone)]
pub struct Recommender {
    repository: Arc<dyn WorkerRepository>,
    engine: ScoringEngine,
    concurrency: usize,
    run_timeout: Option<Duration>,
}

impl Recommender {
    pub fn new(repository: Arc<dyn WorkerRepository>, options: ScoringOptions) -> Self {
        Self {
            engine: ScoringEngine::new(repository.clone(), options),
            repository,
            concurrency: DEFAULT_SCORING_CONCURRENCY,
            run_timeout: None,
        }
    }

    /// Limit how many workers are scored concurrently
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Bound the wall-clock time of a single run
    pub fn with_run_timeout(mut self, run_timeout: Duration) -> Self {
        self.run_timeout = Some(run_timeout);
        self
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Rank workers for a job
    ///
    /// An empty worker pool or an empty radius yields an empty recommendation.
    /// Failing to list workers is reported as [`RecommendError::Unavailable`].
    pub async fn recommend(
        &self,
        job: &Job,
        params: &RecommendationParams,
    ) -> Result<Recommendation, RecommendError> {
        match self.run_timeout {
            Some(budget) => tokio::time::timeout(budget, self.run(job, params))
                .await
                .map_err(|_| RecommendError::TimedOut(budget))?,
            None => self.run(job, params).await,
        }
    }

    /// Like [`Recommender::recommend`], but an unavailable engine yields an
    /// empty recommendation so the job-posting flow can carry on.
    pub async fn recommend_or_empty(&self, job: &Job, params: &RecommendationParams) -> Recommendation {
        match self.recommend(job, params).await {
            Ok(recommendation) => recommendation,
            Err(e) => {
                tracing::error!("No recommendation for job {}: {}", job.id, e);
                Recommendation::empty(job.clone(), params.threshold)
            }
        }
    }

    async fn run(&self, job: &Job, params: &RecommendationParams) -> Result<Recommendation, RecommendError> {
        let workers = self.repository.list_active_workers().await?;
        if workers.is_empty() {
            tracing::info!("No active workers found for job {}", job.id);
            return Ok(Recommendation::empty(job.clone(), params.threshold));
        }
        let total_active = workers.len();

        let nearby = filter_by_radius(workers, job, params.max_distance_km);
        tracing::info!(
            "{} of {} workers within {}km of job {}",
            nearby.len(),
            total_active,
            params.max_distance_km,
            job.id
        );
        if nearby.is_empty() {
            return Ok(Recommendation::empty(job.clone(), params.threshold));
        }

        let engine = &self.engine;
        let scored: Vec<RankedWorker> = stream::iter(nearby)
            .map(|(worker, distance_km)| async move {
                let score = engine.score(&worker, job).await;
                RankedWorker {
                    worker,
                    distance_km,
                    score,
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let selection = select_candidates(&scored, params.threshold, params.max_workers);

        tracing::info!(
            "Recommending {} of {} scored workers for job {} (threshold {}{})",
            selection.workers.len(),
            scored.len(),
            job.id,
            selection.threshold_applied,
            if selection.relaxed { ", relaxed" } else { "" }
        );

        Ok(Recommendation {
            job: job.clone(),
            workers: selection.workers,
            total_scored: scored.len(),
            threshold_applied: selection.threshold_applied,
            relaxed: selection.relaxed,
        })
    }
}

impl std::fmt::Debug for Recommender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recommender")
            .field("engine", &self.engine)
            .field("concurrency", &self.concurrency)
            .field("run_timeout", &self.run_timeout)
            .finish_non_exhaustive()
    }
}
