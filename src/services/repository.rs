use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Application, EmployerId, InteractionCounts, Job, JobId, NewApplication, Worker, WorkerId};

/// Errors that can occur when querying worker history
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Query contract the recommendation engine runs against
///
/// Aggregates count applications once per worker-job pair; a pair is accepted
/// when any of its rows is.
#[async_trait]
pub trait WorkerRepository: Send + Sync {
    /// All workers with the active flag set
    async fn list_active_workers(&self) -> Result<Vec<Worker>, RepositoryError>;

    /// Applications of every neighbor of the given worker
    ///
    /// A neighbor is any other worker whose similarity to the given
    /// demographics reaches [`crate::core::scoring::NEIGHBOR_SIMILARITY_THRESHOLD`].
    async fn count_neighbor_applications(
        &self,
        worker_id: WorkerId,
        experience: Option<i32>,
        age: Option<i32>,
        gender: Option<&str>,
    ) -> Result<InteractionCounts, RepositoryError>;

    /// The worker's own application history
    async fn count_own_applications(&self, worker_id: WorkerId) -> Result<InteractionCounts, RepositoryError>;

    /// Accepted applications of the worker for jobs of the given employer
    async fn count_repeat_employer_acceptances(
        &self,
        worker_id: WorkerId,
        employer_id: EmployerId,
    ) -> Result<u64, RepositoryError>;

    async fn find_worker(&self, worker_id: WorkerId) -> Result<Worker, RepositoryError>;

    async fn find_job(&self, job_id: JobId) -> Result<Job, RepositoryError>;

    /// Append a worker response to the application log
    async fn record_application(&self, application: NewApplication) -> Result<Application, RepositoryError>;

    async fn health_check(&self) -> Result<bool, RepositoryError> {
        Ok(true)
    }
}
