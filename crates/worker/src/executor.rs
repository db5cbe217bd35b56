//! Execution wrapper.
//!
//! Drives one job from `pending` to a terminal status with exactly one send
//! attempt:
//!
//! 1. `pending -> processing` (durable write + event)
//! 2. `sender.send(recipient, payload)`
//! 3. `processing -> completed` on success, `processing -> failed` on any
//!    error, panic or timeout (durable write + event)
//!
//! A crash between steps 1 and 3 leaves the job in `processing`; see
//! [`crate::recovery`]. No automatic retry is performed.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use herald_core::delivery::{DeliveryError, MessageSender};
use herald_core::job_status::JobStatus;
use herald_db::models::job::Job;

use crate::error::EngineError;
use crate::lifecycle::JobLifecycle;

/// Runs single jobs through the send protocol.
#[derive(Clone)]
pub struct JobExecutor {
    lifecycle: JobLifecycle,
    sender: Arc<dyn MessageSender>,
    delivery_timeout: Option<Duration>,
}

impl JobExecutor {
    pub fn new(lifecycle: JobLifecycle, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            lifecycle,
            sender,
            delivery_timeout: None,
        }
    }

    /// Bound each send; a send that exceeds it counts as failed.
    pub fn with_delivery_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    pub fn lifecycle(&self) -> &JobLifecycle {
        &self.lifecycle
    }

    /// Execute `job` and return the terminal status it reached.
    ///
    /// Errors are only returned for store or transition failures. If the
    /// `processing` write fails the send is never attempted. A job that
    /// disappeared before it could be claimed resolves to its snapshot
    /// status without a send.
    pub async fn execute(&self, job: &Job) -> Result<JobStatus, EngineError> {
        let Some(claimed) = self
            .lifecycle
            .transition(job.id, JobStatus::Processing)
            .await?
        else {
            return Ok(job.status);
        };

        tracing::info!(
            job_id = %claimed.id,
            recipient = %claimed.recipient,
            "Sending message",
        );

        let outcome = match self.deliver(&claimed).await {
            Ok(()) => JobStatus::Completed,
            Err(e) => {
                tracing::error!(job_id = %claimed.id, error = %e, "Message delivery failed");
                JobStatus::Failed
            }
        };

        let finished = self.lifecycle.transition(claimed.id, outcome).await?;
        if finished.is_none() {
            tracing::warn!(job_id = %claimed.id, "Job vanished before its terminal write");
        }
        Ok(outcome)
    }

    /// One send attempt with panics and the optional deadline folded into
    /// [`DeliveryError`].
    async fn deliver(&self, job: &Job) -> Result<(), DeliveryError> {
        let send = AssertUnwindSafe(self.sender.send(&job.recipient, &job.payload)).catch_unwind();

        let result = match self.delivery_timeout {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| DeliveryError::TimedOut(limit))?,
            None => send.await,
        };

        result.unwrap_or_else(|panic| Err(DeliveryError::Panicked(panic_message(&*panic))))
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
