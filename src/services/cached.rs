use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::models::{Application, EmployerId, InteractionCounts, Job, JobId, NewApplication, Worker, WorkerId};
use crate::services::cache::{CacheError, CacheKey, CacheManager};
use crate::services::repository::{RepositoryError, WorkerRepository};

/// Read-through statistics cache over another repository
///
/// Caches the per-worker aggregates the scorers query. Recording an
/// application drops the worker's own and employer aggregates and every
/// neighbor aggregate, in both tiers. Cache failures never fail a query.
pub struct CachedRepository {
    inner: Arc<dyn WorkerRepository>,
    cache: Arc<CacheManager>,
    /// Bumped on every invalidation
    generation: AtomicU64,
}

impl CachedRepository {
    pub fn new(inner: Arc<dyn WorkerRepository>, cache: Arc<CacheManager>) -> Self {
        Self {
            inner,
            cache,
            generation: AtomicU64::new(0),
        }
    }

    async fn read_through<T, F>(&self, key: String, fetch: F) -> Result<T, RepositoryError>
    where
        T: Serialize + DeserializeOwned + Send,
        F: Future<Output = Result<T, RepositoryError>> + Send,
    {
        match self.cache.get::<T>(&key).await {
            Ok(value) => return Ok(value),
            Err(CacheError::CacheMiss(_)) => {}
            Err(e) => tracing::warn!("Cache read failed for {}, querying storage: {}", key, e),
        }

        let generation = self.generation.load(Ordering::Acquire);
        let value = fetch.await?;

        if let Err(e) = self.cache.set(&key, &value).await {
            tracing::warn!("Cache write failed for {}: {}", key, e);
        } else if self.generation.load(Ordering::Acquire) != generation {
            // An invalidation ran while fetching; the value may predate it
            tracing::debug!("Dropping {} filled across an invalidation", key);
            if let Err(e) = self.cache.delete(&key).await {
                tracing::warn!("Failed to drop raced cache entry {}: {}", key, e);
            }
        }

        Ok(value)
    }

    /// Drop cached aggregates affected by a new application of a worker
    pub async fn invalidate_worker(&self, worker_id: WorkerId) {
        self.generation.fetch_add(1, Ordering::AcqRel);

        if let Err(e) = self.cache.delete(&CacheKey::own_stats(worker_id)).await {
            tracing::warn!("Failed to invalidate own stats of worker {}: {}", worker_id, e);
        }
        if let Err(e) = self
            .cache
            .invalidate_pattern(&CacheKey::repeat_employer_pattern(worker_id))
            .await
        {
            tracing::warn!("Failed to invalidate employer stats of worker {}: {}", worker_id, e);
        }
        if let Err(e) = self.cache.invalidate_pattern(&CacheKey::neighbor_pattern()).await {
            tracing::warn!("Failed to invalidate neighbor stats after worker {}: {}", worker_id, e);
        }
    }
}

#[async_trait]
impl WorkerRepository for CachedRepository {
    async fn list_active_workers(&self) -> Result<Vec<Worker>, RepositoryError> {
        self.inner.list_active_workers().await
    }

    async fn count_neighbor_applications(
        &self,
        worker_id: WorkerId,
        experience: Option<i32>,
        age: Option<i32>,
        gender: Option<&str>,
    ) -> Result<InteractionCounts, RepositoryError> {
        let key = CacheKey::neighbor_stats(worker_id, experience, age, gender);
        self.read_through(
            key,
            self.inner
                .count_neighbor_applications(worker_id, experience, age, gender),
        )
        .await
    }

    async fn count_own_applications(&self, worker_id: WorkerId) -> Result<InteractionCounts, RepositoryError> {
        self.read_through(
            CacheKey::own_stats(worker_id),
            self.inner.count_own_applications(worker_id),
        )
        .await
    }

    async fn count_repeat_employer_acceptances(
        &self,
        worker_id: WorkerId,
        employer_id: EmployerId,
    ) -> Result<u64, RepositoryError> {
        self.read_through(
            CacheKey::repeat_employer(worker_id, employer_id),
            self.inner.count_repeat_employer_acceptances(worker_id, employer_id),
        )
        .await
    }

    async fn find_worker(&self, worker_id: WorkerId) -> Result<Worker, RepositoryError> {
        self.inner.find_worker(worker_id).await
    }

    async fn find_job(&self, job_id: JobId) -> Result<Job, RepositoryError> {
        self.inner.find_job(job_id).await
    }

    async fn record_application(&self, application: NewApplication) -> Result<Application, RepositoryError> {
        let recorded = self.inner.record_application(application).await?;
        self.invalidate_worker(application.worker_id).await;
        Ok(recorded)
    }

    async fn health_check(&self) -> Result<bool, RepositoryError> {
        self.inner.health_check().await
    }
}
