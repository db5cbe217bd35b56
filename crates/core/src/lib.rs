//! Herald shared domain layer.
//!
//! Zero internal dependencies so the store, the event channel, the worker
//! and the HTTP shell can all share one vocabulary:
//!
//! - [`types`]: id and timestamp aliases.
//! - [`error`]: [`CoreError`](error::CoreError), the domain error taxonomy.
//! - [`job_status`]: the job state machine.
//! - [`job_events`]: wire names for lifecycle event kinds.
//! - [`delivery`]: the outbound message sender boundary.

pub mod delivery;
pub mod error;
pub mod job_events;
pub mod job_status;
pub mod types;
