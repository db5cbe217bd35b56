use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::ws::manager::WsManager;

/// Spawn the observer keep-alive task.
///
/// Every `every` it pings all registered observers; observers whose channel
/// has closed are evicted by the ping. The first ping happens one full
/// period after start. The task exits when `shutdown` is cancelled.
pub fn start_heartbeat(
    ws_manager: Arc<WsManager>,
    every: Duration,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let reached = ws_manager.ping_all().await;
                    if reached > 0 {
                        tracing::trace!(reached, "WebSocket heartbeat ping");
                    }
                }
            }
        }
        tracing::debug!("WebSocket heartbeat stopped");
    })
}
