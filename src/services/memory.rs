use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::core::scoring::is_neighbor;
use crate::models::{
    Application, ApplicationStatus, Demographics, EmployerId, InteractionCounts, Job, JobId, NewApplication, Worker,
    WorkerId,
};
use crate::services::repository::{RepositoryError, WorkerRepository};

/// In-memory implementation of WorkerRepository (not durable).
///
/// Suitable for tests, benchmarks and local demos.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    workers: RwLock<Vec<Worker>>,
    jobs: RwLock<HashMap<JobId, Job>>,
    applications: RwLock<Vec<Application>>,
}

impl InMemoryRepository {
    pub fn new(workers: Vec<Worker>, jobs: Vec<Job>, applications: Vec<Application>) -> Self {
        Self {
            workers: RwLock::new(workers),
            jobs: RwLock::new(jobs.into_iter().map(|job| (job.id, job)).collect()),
            applications: RwLock::new(applications),
        }
    }

    pub async fn insert_job(&self, job: Job) {
        self.jobs.write().await.insert(job.id, job);
    }

    /// Soft-deactivate a worker, keeping their history
    pub async fn deactivate_worker(&self, worker_id: WorkerId) -> bool {
        let mut workers = self.workers.write().await;
        match workers.iter_mut().find(|w| w.id == worker_id) {
            Some(worker) => {
                worker.active = false;
                true
            }
            None => false,
        }
    }
}

/// Collapse application rows to one entry per worker-job pair
fn count_pairs<'a>(applications: impl Iterator<Item = &'a Application>) -> InteractionCounts {
    let mut pairs: HashMap<(WorkerId, JobId), bool> = HashMap::new();
    for application in applications {
        let accepted = pairs.entry((application.worker_id, application.job_id)).or_insert(false);
        *accepted |= application.status == ApplicationStatus::Accepted;
    }

    InteractionCounts {
        total: pairs.len() as u64,
        accepted: pairs.values().filter(|accepted| **accepted).count() as u64,
    }
}

#[async_trait]
impl WorkerRepository for InMemoryRepository {
    async fn list_active_workers(&self) -> Result<Vec<Worker>, RepositoryError> {
        let workers = self.workers.read().await;
        Ok(workers.iter().filter(|w| w.active).cloned().collect())
    }

    async fn count_neighbor_applications(
        &self,
        worker_id: WorkerId,
        experience: Option<i32>,
        age: Option<i32>,
        gender: Option<&str>,
    ) -> Result<InteractionCounts, RepositoryError> {
        let candidate = Demographics {
            age,
            gender: gender.map(str::to_string),
            experience,
        };

        let neighbors: HashSet<WorkerId> = self
            .workers
            .read()
            .await
            .iter()
            .filter(|w| w.id != worker_id && is_neighbor(&candidate, &w.demographics()))
            .map(|w| w.id)
            .collect();

        let applications = self.applications.read().await;
        Ok(count_pairs(
            applications.iter().filter(|a| neighbors.contains(&a.worker_id)),
        ))
    }

    async fn count_own_applications(&self, worker_id: WorkerId) -> Result<InteractionCounts, RepositoryError> {
        let applications = self.applications.read().await;
        Ok(count_pairs(applications.iter().filter(|a| a.worker_id == worker_id)))
    }

    async fn count_repeat_employer_acceptances(
        &self,
        worker_id: WorkerId,
        employer_id: EmployerId,
    ) -> Result<u64, RepositoryError> {
        let jobs = self.jobs.read().await;
        let applications = self.applications.read().await;

        let count = applications
            .iter()
            .filter(|a| a.worker_id == worker_id && a.status == ApplicationStatus::Accepted)
            .filter(|a| {
                jobs.get(&a.job_id)
                    .is_some_and(|job| job.employer_id == Some(employer_id))
            })
            .count();

        Ok(count as u64)
    }

    async fn find_worker(&self, worker_id: WorkerId) -> Result<Worker, RepositoryError> {
        self.workers
            .read()
            .await
            .iter()
            .find(|w| w.id == worker_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("worker {}", worker_id)))
    }

    async fn find_job(&self, job_id: JobId) -> Result<Job, RepositoryError> {
        self.jobs
            .read()
            .await
            .get(&job_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("job {}", job_id)))
    }

    async fn record_application(&self, application: NewApplication) -> Result<Application, RepositoryError> {
        if !self.workers.read().await.iter().any(|w| w.id == application.worker_id) {
            return Err(RepositoryError::NotFound(format!("worker {}", application.worker_id)));
        }
        if !self.jobs.read().await.contains_key(&application.job_id) {
            return Err(RepositoryError::NotFound(format!("job {}", application.job_id)));
        }

        let mut applications = self.applications.write().await;
        let id = applications.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let recorded = Application {
            id,
            worker_id: application.worker_id,
            job_id: application.job_id,
            status: application.status,
            created_at: Utc::now(),
        };
        applications.push(recorded.clone());

        Ok(recorded)
    }
}
