//! Repository for the `jobs` table.
//!
//! Status values are written via `JobStatus::as_str`; timestamps via
//! `encode_timestamp`. No string literals for either appear in SQL.

use herald_core::job_status::JobStatus;
use herald_core::types::{JobId, Timestamp};
use sqlx::SqlitePool;

use crate::error::DbError;
use crate::models::job::{encode_timestamp, Job, JobRow};

/// Column list for `jobs` queries.
const COLUMNS: &str = "id, recipient, payload, status, created_at, scheduled_time, updated_at";

/// Provides CRUD operations for outbound message jobs.
pub struct JobRepo;

impl JobRepo {
    /// Insert a fully-formed job. Returns the row as stored.
    pub async fn insert(pool: &SqlitePool, job: &Job) -> Result<Job, DbError> {
        let query = format!(
            "INSERT INTO jobs (id, recipient, payload, status, created_at, scheduled_time, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(job.id.to_string())
            .bind(&job.recipient)
            .bind(&job.payload)
            .bind(job.status.as_str())
            .bind(encode_timestamp(&job.created_at))
            .bind(job.scheduled_time.as_ref().map(encode_timestamp))
            .bind(encode_timestamp(&job.updated_at))
            .fetch_one(pool)
            .await?;
        Job::try_from(row)
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &SqlitePool, id: JobId) -> Result<Option<Job>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = ?");
        sqlx::query_as::<_, JobRow>(&query)
            .bind(id.to_string())
            .fetch_optional(pool)
            .await?
            .map(Job::try_from)
            .transpose()
    }

    /// Persist the mutable fields (`status`, `updated_at`) of an existing job.
    ///
    /// Fails with [`DbError::NotFound`] if no row has the job's id.
    pub async fn update(pool: &SqlitePool, job: &Job) -> Result<Job, DbError> {
        let query = format!(
            "UPDATE jobs SET status = ?, updated_at = ? \
             WHERE id = ? \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(job.status.as_str())
            .bind(encode_timestamp(&job.updated_at))
            .bind(job.id.to_string())
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| DbError::NotFound(job.id.to_string()))?;
        Job::try_from(row)
    }

    /// All pending jobs that are unscheduled or scheduled at or before `now`.
    ///
    /// Returned oldest first, though callers must not depend on the order.
    pub async fn list_eligible_pending(
        pool: &SqlitePool,
        now: Timestamp,
    ) -> Result<Vec<Job>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             WHERE status = ? AND (scheduled_time IS NULL OR scheduled_time <= ?) \
             ORDER BY created_at ASC"
        );
        let rows = sqlx::query_as::<_, JobRow>(&query)
            .bind(JobStatus::Pending.as_str())
            .bind(encode_timestamp(&now))
            .fetch_all(pool)
            .await?;
        rows.into_iter().map(Job::try_from).collect()
    }

    /// All jobs currently in `status`, oldest first.
    pub async fn list_by_status(
        pool: &SqlitePool,
        status: JobStatus,
    ) -> Result<Vec<Job>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs WHERE status = ? ORDER BY created_at ASC"
        );
        let rows = sqlx::query_as::<_, JobRow>(&query)
            .bind(status.as_str())
            .fetch_all(pool)
            .await?;
        rows.into_iter().map(Job::try_from).collect()
    }
}
