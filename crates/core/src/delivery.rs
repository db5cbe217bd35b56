//! Outbound message sender boundary.
//!
//! The actual telephony provider call is opaque to the rest of the system:
//! it may take a long time, it may fail, and it is not assumed idempotent.
//! The execution wrapper calls it at most once per job.

use std::time::Duration;

use async_trait::async_trait;

/// Why a send did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The provider refused the message (bad number, blocked content, ...).
    #[error("Delivery rejected: {0}")]
    Rejected(String),

    /// The provider could not be reached or returned a transport failure.
    #[error("Delivery transport error: {0}")]
    Transport(String),

    #[error("Delivery timed out after {0:?}")]
    TimedOut(Duration),

    /// The sender panicked mid-call.
    #[error("Delivery panicked: {0}")]
    Panicked(String),
}

/// Sends one message to one recipient.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, recipient: &str, payload: &str) -> Result<(), DeliveryError>;
}
