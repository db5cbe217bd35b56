//! Update-to-observer fan-out loop.

use std::sync::Arc;

use axum::extract::ws::Message;
use herald_events::{JobUpdate, UpdateReceiver};

use crate::ws::WsManager;

/// Pushes job updates to every registered WebSocket observer.
///
/// Events are forwarded in the order they were published. A failure on one
/// event or one observer never stops the loop.
pub struct UpdateFanout {
    ws_manager: Arc<WsManager>,
}

impl UpdateFanout {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run until every publisher has been dropped and the channel is empty.
    pub async fn run(self, mut receiver: UpdateReceiver) {
        while let Some(update) = receiver.recv().await {
            self.deliver(&update).await;
        }
        tracing::info!("Update channel closed, fan-out shutting down");
    }

    /// Serialize one update and broadcast it. Returns how many observers
    /// received it.
    pub async fn deliver(&self, update: &JobUpdate) -> usize {
        let text = match update.to_json() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(
                    job_id = %update.job_id,
                    error = %e,
                    "Failed to serialize job update",
                );
                return 0;
            }
        };

        let reached = self.ws_manager.broadcast(Message::Text(text.into())).await;
        tracing::debug!(
            job_id = %update.job_id,
            status = %update.status,
            kind = update.kind.as_str(),
            reached,
            "Job update fanned out",
        );
        reached
    }
}

#[cfg(test)]
mod tests {
    use herald_core::job_status::JobStatus;
    use herald_events::update_channel;

    use super::*;

    fn text_of(message: Message) -> serde_json::Value {
        match message {
            Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn forwards_updates_in_order_and_stops_when_channel_closes() {
        let ws_manager = Arc::new(WsManager::new());
        let mut observer = ws_manager.add("observer".to_string()).await;
        let (publisher, receiver) = update_channel();

        let id = uuid::Uuid::new_v4();
        publisher.publish(JobUpdate::created(id, JobStatus::Pending));
        publisher.publish(JobUpdate::updated(id, JobStatus::Processing));
        publisher.publish(JobUpdate::updated(id, JobStatus::Completed));
        drop(publisher);

        UpdateFanout::new(Arc::clone(&ws_manager)).run(receiver).await;

        let mut seen = Vec::new();
        while let Ok(message) = observer.try_recv() {
            let json = text_of(message);
            assert_eq!(json["jobId"], id.to_string());
            seen.push(format!("{}:{}", json["type"], json["status"]));
        }
        assert_eq!(
            seen,
            [
                r#""created":"pending""#,
                r#""updated":"processing""#,
                r#""updated":"completed""#,
            ]
        );
    }

    #[tokio::test]
    async fn closed_observer_does_not_block_the_others() {
        let ws_manager = Arc::new(WsManager::new());
        let gone = ws_manager.add("gone".to_string()).await;
        let mut alive = ws_manager.add("alive".to_string()).await;
        drop(gone);

        let fanout = UpdateFanout::new(Arc::clone(&ws_manager));
        let reached = fanout
            .deliver(&JobUpdate::created(uuid::Uuid::new_v4(), JobStatus::Pending))
            .await;

        assert_eq!(reached, 1);
        assert!(alive.try_recv().is_ok());
        assert_eq!(ws_manager.connection_count().await, 1);
    }

    #[tokio::test]
    async fn delivery_with_no_observers_reaches_nobody() {
        let fanout = UpdateFanout::new(Arc::new(WsManager::new()));
        let reached = fanout
            .deliver(&JobUpdate::created(uuid::Uuid::new_v4(), JobStatus::Pending))
            .await;
        assert_eq!(reached, 0);
    }
}
