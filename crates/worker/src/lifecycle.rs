//! Job lifecycle engine.
//!
//! [`JobLifecycle`] is the only component that writes a job's `status` and
//! `updated_at`. Every write is followed by exactly one event on the update
//! channel, so observers see `created` once and then one `updated` per
//! transition, in order.

use std::sync::Arc;

use chrono::Utc;
use herald_core::error::CoreError;
use herald_core::job_status::JobStatus;
use herald_core::types::JobId;
use herald_db::models::job::{CreateJob, Job};
use herald_db::JobStore;
use herald_events::{JobUpdate, UpdatePublisher};

use crate::error::EngineError;

/// Create, read and transition jobs.
#[derive(Clone)]
pub struct JobLifecycle {
    store: Arc<dyn JobStore>,
    updates: UpdatePublisher,
}

impl JobLifecycle {
    pub fn new(store: Arc<dyn JobStore>, updates: UpdatePublisher) -> Self {
        Self { store, updates }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Persist a new pending job and announce it.
    pub async fn create(&self, input: CreateJob) -> Result<Job, EngineError> {
        if input.recipient.trim().is_empty() {
            return Err(CoreError::Validation("recipient must not be empty".into()).into());
        }
        if input.payload.trim().is_empty() {
            return Err(CoreError::Validation("payload must not be empty".into()).into());
        }

        let now = Utc::now();
        let job = Job {
            id: uuid::Uuid::new_v4(),
            recipient: input.recipient,
            payload: input.payload,
            status: JobStatus::Pending,
            created_at: now,
            scheduled_time: input.scheduled_time,
            updated_at: now,
        };

        let job = self.store.insert(&job).await?;
        self.updates
            .publish(JobUpdate::created(job.id, job.status));

        tracing::info!(
            job_id = %job.id,
            scheduled_time = ?job.scheduled_time,
            "Job created",
        );
        Ok(job)
    }

    pub async fn get(&self, id: JobId) -> Result<Option<Job>, EngineError> {
        Ok(self.store.get(id).await?)
    }

    /// Move a job to `next`.
    ///
    /// Returns `Ok(None)` if the job does not exist. Illegal moves are
    /// rejected with [`CoreError::InvalidTransition`] before anything is
    /// written or published.
    pub async fn transition(
        &self,
        id: JobId,
        next: JobStatus,
    ) -> Result<Option<Job>, EngineError> {
        let Some(mut job) = self.store.get(id).await? else {
            tracing::warn!(job_id = %id, status = %next, "Transition on unknown job");
            return Ok(None);
        };

        let previous = job.status;
        job.status = previous.transition_to(next)?;
        job.updated_at = Utc::now().max(job.created_at);

        let job = self.store.update(&job).await?;
        self.updates.publish(JobUpdate::updated(job.id, job.status));

        tracing::debug!(
            job_id = %job.id,
            from = %previous,
            to = %job.status,
            "Job transitioned",
        );
        Ok(Some(job))
    }
}
