//! Simulated telephony sender.
//!
//! Stands in for a real provider client: logs the message, waits for the
//! configured latency, and reports success.

use std::time::Duration;

use async_trait::async_trait;
use herald_core::delivery::{DeliveryError, MessageSender};

pub struct SimulatedSender {
    latency: Duration,
}

impl SimulatedSender {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl MessageSender for SimulatedSender {
    async fn send(&self, recipient: &str, payload: &str) -> Result<(), DeliveryError> {
        tracing::info!(
            recipient,
            payload_len = payload.len(),
            latency_ms = self.latency.as_millis() as u64,
            "Simulating call",
        );
        tokio::time::sleep(self.latency).await;
        Ok(())
    }
}
