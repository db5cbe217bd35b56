//! Job entity model and DTOs.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use herald_core::job_status::JobStatus;
use herald_core::types::{JobId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::error::DbError;

/// One outbound message job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub recipient: String,
    pub payload: String,
    pub status: JobStatus,
    pub created_at: Timestamp,
    pub scheduled_time: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl Job {
    /// Whether the scheduler may pick this job up at `now`.
    pub fn is_eligible(&self, now: Timestamp) -> bool {
        self.status == JobStatus::Pending && self.scheduled_time.map_or(true, |at| at <= now)
    }
}

/// DTO for creating a job via `POST /api/v1/jobs`.
///
/// Accepts the legacy `phone_number` / `message` / `scheduled_time` field
/// names as aliases. A `scheduledTime` without an offset is read as UTC.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJob {
    #[serde(alias = "phone_number")]
    pub recipient: String,
    #[serde(alias = "message")]
    pub payload: String,
    #[serde(
        default,
        alias = "scheduled_time",
        deserialize_with = "deserialize_scheduled_time"
    )]
    pub scheduled_time: Option<Timestamp>,
}

fn deserialize_scheduled_time<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_client_timestamp(&raw).map_err(serde::de::Error::custom))
        .transpose()
}

/// Parse a client-supplied ISO-8601 timestamp. Values carrying an offset are
/// converted to UTC; naive values are taken to already be UTC.
fn parse_client_timestamp(raw: &str) -> Result<Timestamp, String> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid timestamp {raw:?}, expected ISO-8601"))
}

/// Encode a timestamp the way the `jobs` table stores it.
pub(crate) fn encode_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_timestamp(column: &str, raw: &str) -> Result<Timestamp, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DbError::Decode(format!("{column} {raw:?}: {e}")))
}

/// Raw `jobs` row as stored in SQLite.
#[derive(Debug, FromRow)]
pub struct JobRow {
    pub id: String,
    pub recipient: String,
    pub payload: String,
    pub status: String,
    pub created_at: String,
    pub scheduled_time: Option<String>,
    pub updated_at: String,
}

impl TryFrom<JobRow> for Job {
    type Error = DbError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let id = row
            .id
            .parse()
            .map_err(|e| DbError::Decode(format!("id {:?}: {e}", row.id)))?;
        let status = row.status.parse().map_err(DbError::Decode)?;
        let scheduled_time = row
            .scheduled_time
            .as_deref()
            .map(|raw| decode_timestamp("scheduled_time", raw))
            .transpose()?;

        Ok(Job {
            id,
            recipient: row.recipient,
            payload: row.payload,
            status,
            created_at: decode_timestamp("created_at", &row.created_at)?,
            scheduled_time,
            updated_at: decode_timestamp("updated_at", &row.updated_at)?,
        })
    }
}
