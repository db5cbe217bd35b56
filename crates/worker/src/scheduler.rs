//! Background job scheduler.
//!
//! Polls the store every `poll_interval` for eligible pending jobs and runs
//! each one through the [`JobExecutor`], one after another, inside the same
//! cycle. Errors never stop the loop: they are logged, counted in
//! [`SchedulerStats`], and the next tick tries again. There is no backoff
//! beyond the fixed interval.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use herald_core::types::Timestamp;
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::SchedulerConfig;
use crate::error::EngineError;
use crate::executor::JobExecutor;
use crate::recovery;

/// Live counters for the scheduler loop.
#[derive(Default)]
pub struct SchedulerStats {
    cycles: AtomicU64,
    failed_cycles: AtomicU64,
    jobs_dispatched: AtomicU64,
    last_error: Mutex<Option<LastError>>,
}

/// Most recent error seen by the loop.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastError {
    pub message: String,
    pub at: Timestamp,
}

/// Point-in-time copy of [`SchedulerStats`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerSnapshot {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub jobs_dispatched: u64,
    pub last_error: Option<LastError>,
}

impl SchedulerStats {
    pub fn snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            failed_cycles: self.failed_cycles.load(Ordering::Relaxed),
            jobs_dispatched: self.jobs_dispatched.load(Ordering::Relaxed),
            last_error: self
                .last_error
                .lock()
                .map(|e| e.clone())
                .unwrap_or_default(),
        }
    }

    fn record_error(&self, error: &EngineError) {
        if let Ok(mut last) = self.last_error.lock() {
            *last = Some(LastError {
                message: error.to_string(),
                at: Utc::now(),
            });
        }
    }
}

/// Shortest period the loop will tick at.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// The polling loop.
pub struct JobScheduler {
    executor: JobExecutor,
    poll_interval: Duration,
    recover_on_start: bool,
    stats: Arc<SchedulerStats>,
}

impl JobScheduler {
    pub fn new(executor: JobExecutor, config: &SchedulerConfig) -> Self {
        Self {
            executor,
            poll_interval: config.poll_interval.max(MIN_POLL_INTERVAL),
            recover_on_start: config.recover_on_start,
            stats: Arc::new(SchedulerStats::default()),
        }
    }

    /// Shared handle to the loop's counters.
    pub fn stats(&self) -> Arc<SchedulerStats> {
        Arc::clone(&self.stats)
    }

    /// Run until `cancel` is triggered.
    ///
    /// The store is initialized once before the first cycle. If that fails
    /// the loop keeps ticking and retries initialization instead of polling.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Job scheduler started",
        );

        let mut ready = false;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Job scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if !ready {
                        ready = self.start_up().await;
                        if !ready {
                            continue;
                        }
                    }
                    let _ = self.run_cycle(Utc::now()).await;
                }
            }
        }
    }

    /// Store initialization plus the optional orphan sweep.
    ///
    /// Returns `false` if the store could not be initialized.
    async fn start_up(&self) -> bool {
        if let Err(e) = self.executor.lifecycle().store().init().await {
            let e = EngineError::from(e);
            tracing::error!(error = %e, "Job store initialization failed");
            self.stats.failed_cycles.fetch_add(1, Ordering::Relaxed);
            self.stats.record_error(&e);
            return false;
        }
        tracing::info!("Job store initialized");

        if self.recover_on_start {
            if let Err(e) = recovery::fail_orphaned_jobs(self.executor.lifecycle()).await {
                tracing::error!(error = %e, "Orphaned job recovery failed");
                self.stats.record_error(&e);
            }
        }
        true
    }

    /// One polling cycle at `now`. Returns how many jobs were dispatched.
    ///
    /// A failed query counts as a failed cycle. A failure on one job is
    /// logged and recorded, and the rest of the batch still runs.
    pub async fn run_cycle(&self, now: Timestamp) -> usize {
        self.stats.cycles.fetch_add(1, Ordering::Relaxed);

        let mut jobs = match self
            .executor
            .lifecycle()
            .store()
            .query_eligible_pending(now)
            .await
        {
            Ok(jobs) => jobs,
            Err(e) => {
                let e = EngineError::from(e);
                tracing::error!(error = %e, "Error polling for jobs");
                self.stats.failed_cycles.fetch_add(1, Ordering::Relaxed);
                self.stats.record_error(&e);
                return 0;
            }
        };

        let returned = jobs.len();
        jobs.retain(|job| job.is_eligible(now));
        if jobs.len() < returned {
            tracing::warn!(
                skipped = returned - jobs.len(),
                "Store returned jobs that are not yet due or not pending",
            );
        }

        if !jobs.is_empty() {
            tracing::debug!(count = jobs.len(), "Dispatching eligible jobs");
        }

        let mut dispatched = 0;
        for job in &jobs {
            match self.executor.execute(job).await {
                Ok(status) => {
                    tracing::info!(job_id = %job.id, status = %status, "Job finished");
                }
                Err(e) => {
                    tracing::error!(job_id = %job.id, error = %e, "Error processing job");
                    self.stats.record_error(&e);
                }
            }
            dispatched += 1;
        }

        self.stats
            .jobs_dispatched
            .fetch_add(dispatched as u64, Ordering::Relaxed);
        dispatched
    }
}
