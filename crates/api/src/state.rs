use std::sync::Arc;

use herald_worker::{JobLifecycle, SchedulerStats};

use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Job lifecycle engine; the only path handlers use to create or read jobs.
    pub lifecycle: JobLifecycle,
    /// WebSocket connection manager (update observers).
    pub ws_manager: Arc<WsManager>,
    /// Live counters of the background scheduler, reported by `/health`.
    pub scheduler_stats: Arc<SchedulerStats>,
}
