//! Herald job lifecycle engine.
//!
//! - [`lifecycle`]: create/read/transition, the only writer of job status.
//! - [`executor`]: drives one job through a single send attempt.
//! - [`scheduler`]: the polling loop that finds due jobs.
//! - [`recovery`]: start-up sweep for jobs orphaned mid-send.
//! - [`delivery`]: the simulated message sender.
//! - [`config`]: scheduler settings loaded from the environment.

pub mod config;
pub mod delivery;
pub mod error;
pub mod executor;
pub mod lifecycle;
pub mod recovery;
pub mod scheduler;

pub use config::SchedulerConfig;
pub use error::EngineError;
pub use executor::JobExecutor;
pub use lifecycle::JobLifecycle;
pub use scheduler::{JobScheduler, SchedulerSnapshot, SchedulerStats};
