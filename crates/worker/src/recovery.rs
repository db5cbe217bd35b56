//! Start-up sweep for jobs orphaned by a crash.
//!
//! Only one scheduler process ever runs, so a job still in `processing` when
//! the scheduler starts was abandoned mid-send by the previous run. Whether
//! the message went out is unknown; re-sending could duplicate it, so the
//! job is moved to `failed` instead. Callers that want another attempt
//! create a new job.

use herald_core::job_status::JobStatus;

use crate::error::EngineError;
use crate::lifecycle::JobLifecycle;

/// Fail every job left in `processing`. Returns how many were recovered.
///
/// A job that cannot be transitioned is logged and skipped; only a failure
/// to list candidates is returned as an error.
pub async fn fail_orphaned_jobs(lifecycle: &JobLifecycle) -> Result<usize, EngineError> {
    let orphans = lifecycle
        .store()
        .list_by_status(JobStatus::Processing)
        .await?;

    let mut recovered = 0;
    for job in orphans {
        match lifecycle.transition(job.id, JobStatus::Failed).await {
            Ok(Some(_)) => {
                tracing::warn!(job_id = %job.id, "Failed job orphaned in processing");
                recovered += 1;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(job_id = %job.id, error = %e, "Could not recover orphaned job");
            }
        }
    }

    if recovered > 0 {
        tracing::info!(recovered, "Orphaned job recovery complete");
    }
    Ok(recovered)
}
