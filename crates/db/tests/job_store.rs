//! Integration tests for the SQLite job store.
//!
//! Each test runs against a fresh in-memory database with the embedded
//! migrations applied.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use herald_core::job_status::JobStatus;
use herald_core::types::Timestamp;
use herald_db::models::job::Job;
use herald_db::{DbError, JobStore, SqliteJobStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn store() -> SqliteJobStore {
    let pool = herald_db::create_memory_pool().await.unwrap();
    let store = SqliteJobStore::new(pool);
    store.init().await.unwrap();
    store
}

fn new_job(scheduled_time: Option<Timestamp>) -> Job {
    let now = Utc::now();
    Job {
        id: uuid::Uuid::new_v4(),
        recipient: "+15551234567".to_string(),
        payload: "hello".to_string(),
        status: JobStatus::Pending,
        created_at: now,
        scheduled_time,
        updated_at: now,
    }
}

// ---------------------------------------------------------------------------
// Insert / get
// ---------------------------------------------------------------------------

#[tokio::test]
async fn insert_then_get_returns_stored_row() {
    let store = store().await;
    let job = new_job(None);

    let inserted = store.insert(&job).await.unwrap();
    assert_eq!(inserted.id, job.id);
    assert_eq!(inserted.recipient, "+15551234567");
    assert_eq!(inserted.status, JobStatus::Pending);

    let fetched = store.get(job.id).await.unwrap().expect("job should exist");
    assert_eq!(fetched, inserted);
}

#[tokio::test]
async fn get_twice_returns_identical_snapshots() {
    let store = store().await;
    let job = store.insert(&new_job(None)).await.unwrap();

    let first = store.get(job.id).await.unwrap();
    let second = store.get(job.id).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn get_unknown_id_returns_none() {
    let store = store().await;
    assert!(store.get(uuid::Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_id_is_rejected() {
    let store = store().await;
    let job = new_job(None);
    store.insert(&job).await.unwrap();

    assert_matches!(store.insert(&job).await, Err(DbError::Sqlx(_)));
}

#[tokio::test]
async fn init_is_idempotent() {
    let store = store().await;
    store.init().await.unwrap();
    store.ping().await.unwrap();
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_persists_status_and_updated_at() {
    let store = store().await;
    let mut job = store.insert(&new_job(None)).await.unwrap();

    job.status = JobStatus::Processing;
    job.updated_at = job.created_at + Duration::seconds(1);
    let updated = store.update(&job).await.unwrap();

    assert_eq!(updated.status, JobStatus::Processing);
    assert_eq!(updated.updated_at, job.updated_at);
    assert_eq!(store.get(job.id).await.unwrap(), Some(updated));
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let store = store().await;
    let job = new_job(None);

    assert_matches!(store.update(&job).await, Err(DbError::NotFound(id)) if id == job.id.to_string());
}

#[tokio::test]
async fn update_does_not_touch_immutable_fields() {
    let store = store().await;
    let original = store.insert(&new_job(None)).await.unwrap();

    let mut edited = original.clone();
    edited.recipient = "+10000000000".to_string();
    edited.payload = "changed".to_string();
    edited.status = JobStatus::Processing;
    let updated = store.update(&edited).await.unwrap();

    assert_eq!(updated.recipient, original.recipient);
    assert_eq!(updated.payload, original.payload);
    assert_eq!(updated.created_at, original.created_at);
}

// ---------------------------------------------------------------------------
// Eligibility query
// ---------------------------------------------------------------------------

#[tokio::test]
async fn future_job_is_gated_until_its_scheduled_time() {
    let store = store().await;
    let now = Utc::now();
    let job = store
        .insert(&new_job(Some(now + Duration::seconds(10))))
        .await
        .unwrap();

    let due_now = store.query_eligible_pending(now).await.unwrap();
    assert!(due_now.iter().all(|j| j.id != job.id));

    let due_later = store
        .query_eligible_pending(now + Duration::seconds(11))
        .await
        .unwrap();
    assert!(due_later.iter().any(|j| j.id == job.id));
}

#[tokio::test]
async fn job_scheduled_exactly_now_is_eligible() {
    let store = store().await;
    let now = Utc::now();
    let job = store.insert(&new_job(Some(now))).await.unwrap();

    let due = store.query_eligible_pending(now).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, job.id);
}

#[tokio::test]
async fn unscheduled_and_past_jobs_are_eligible() {
    let store = store().await;
    let now = Utc::now();
    let unscheduled = store.insert(&new_job(None)).await.unwrap();
    let past = store
        .insert(&new_job(Some(now - Duration::minutes(5))))
        .await
        .unwrap();

    let ids: Vec<_> = store
        .query_eligible_pending(now)
        .await
        .unwrap()
        .into_iter()
        .map(|j| j.id)
        .collect();
    assert!(ids.contains(&unscheduled.id));
    assert!(ids.contains(&past.id));
}

#[tokio::test]
async fn non_pending_jobs_are_never_eligible() {
    let store = store().await;
    let mut job = store.insert(&new_job(None)).await.unwrap();
    job.status = JobStatus::Processing;
    store.update(&job).await.unwrap();

    assert!(store
        .query_eligible_pending(Utc::now())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn list_by_status_filters() {
    let store = store().await;
    let pending = store.insert(&new_job(None)).await.unwrap();
    let mut processing = store.insert(&new_job(None)).await.unwrap();
    processing.status = JobStatus::Processing;
    store.update(&processing).await.unwrap();

    let found = store.list_by_status(JobStatus::Processing).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, processing.id);

    let found = store.list_by_status(JobStatus::Pending).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, pending.id);
}
