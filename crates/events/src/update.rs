//! Lifecycle event envelope.

use chrono::Utc;
use herald_core::job_events::{EVENT_TYPE_CREATED, EVENT_TYPE_UPDATED};
use herald_core::job_status::JobStatus;
use herald_core::types::{JobId, Timestamp};
use serde::{Deserialize, Serialize};

/// Whether the event announces a new job or a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    Created,
    Updated,
}

impl UpdateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateKind::Created => EVENT_TYPE_CREATED,
            UpdateKind::Updated => EVENT_TYPE_UPDATED,
        }
    }
}

/// A job lifecycle event.
///
/// Serialized for observers as
/// `{"jobId": "...", "status": "pending", "type": "created", "timestamp": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    pub job_id: JobId,
    pub status: JobStatus,
    #[serde(rename = "type")]
    pub kind: UpdateKind,
    /// When the event was emitted (UTC).
    pub timestamp: Timestamp,
}

impl JobUpdate {
    /// A job was persisted for the first time.
    pub fn created(job_id: JobId, status: JobStatus) -> Self {
        Self::new(job_id, status, UpdateKind::Created)
    }

    /// A job moved to `status`.
    pub fn updated(job_id: JobId, status: JobStatus) -> Self {
        Self::new(job_id, status, UpdateKind::Updated)
    }

    fn new(job_id: JobId, status: JobStatus, kind: UpdateKind) -> Self {
        Self {
            job_id,
            status,
            kind,
            timestamp: Utc::now(),
        }
    }

    /// Render as the JSON text frame sent to observers.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
