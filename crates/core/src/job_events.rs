//! Wire names for job lifecycle event kinds.
//!
//! Used by `herald_events::JobUpdate` when serializing the `type` field of
//! events pushed to WebSocket observers.

/// Emitted once when a job is first persisted.
pub const EVENT_TYPE_CREATED: &str = "created";

/// Emitted after every status transition.
pub const EVENT_TYPE_UPDATED: &str = "updated";
