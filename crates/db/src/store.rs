//! The job store seam.
//!
//! [`JobStore`] is the only way the lifecycle engine and the scheduler touch
//! durable state. [`SqliteJobStore`] is the production implementation;
//! tests wrap it to inject failures.

use async_trait::async_trait;
use herald_core::job_status::JobStatus;
use herald_core::types::{JobId, Timestamp};

use crate::error::DbError;
use crate::models::job::Job;
use crate::repositories::JobRepo;
use crate::DbPool;

/// Durable record of jobs.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Schema and connection setup. Safe to call more than once.
    async fn init(&self) -> Result<(), DbError>;

    async fn insert(&self, job: &Job) -> Result<Job, DbError>;

    async fn get(&self, id: JobId) -> Result<Option<Job>, DbError>;

    /// Persist `status` and `updated_at`. Fails with [`DbError::NotFound`]
    /// for an unknown id.
    async fn update(&self, job: &Job) -> Result<Job, DbError>;

    /// Pending jobs that are unscheduled or due at `now`. Order unspecified.
    async fn query_eligible_pending(&self, now: Timestamp) -> Result<Vec<Job>, DbError>;

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, DbError>;

    async fn ping(&self) -> Result<(), DbError>;
}

/// [`JobStore`] backed by a SQLite pool.
#[derive(Clone)]
pub struct SqliteJobStore {
    pool: DbPool,
}

impl SqliteJobStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    #[tracing::instrument(skip(self))]
    async fn init(&self) -> Result<(), DbError> {
        crate::run_migrations(&self.pool).await?;
        tracing::debug!("job store schema ready");
        Ok(())
    }

    #[tracing::instrument(skip(self, job), fields(job_id = %job.id))]
    async fn insert(&self, job: &Job) -> Result<Job, DbError> {
        JobRepo::insert(&self.pool, job).await
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, id: JobId) -> Result<Option<Job>, DbError> {
        JobRepo::find_by_id(&self.pool, id).await
    }

    #[tracing::instrument(skip(self, job), fields(job_id = %job.id, status = %job.status))]
    async fn update(&self, job: &Job) -> Result<Job, DbError> {
        JobRepo::update(&self.pool, job).await
    }

    #[tracing::instrument(skip(self))]
    async fn query_eligible_pending(&self, now: Timestamp) -> Result<Vec<Job>, DbError> {
        JobRepo::list_eligible_pending(&self.pool, now).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, DbError> {
        JobRepo::list_by_status(&self.pool, status).await
    }

    async fn ping(&self) -> Result<(), DbError> {
        crate::health_check(&self.pool).await
    }
}
