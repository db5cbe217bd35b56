//! In-process update channel backed by a `tokio::sync::mpsc` unbounded
//! channel.
//!
//! Unlike a broadcast bus, nothing is ever dropped for a slow consumer: the
//! queue grows instead, and producers never wait. Events come out in the
//! order they went in. There is exactly one [`UpdateReceiver`]; fanning
//! events out to many observers is the consumer's job.
//!
//! # Usage
//!
//! ```rust
//! use herald_core::job_status::JobStatus;
//! use herald_events::{update_channel, JobUpdate};
//!
//! # tokio_test_block(async {
//! let (publisher, mut receiver) = update_channel();
//! let id = herald_core::types::JobId::nil();
//! publisher.publish(JobUpdate::created(id, JobStatus::Pending));
//!
//! let event = receiver.recv().await.unwrap();
//! assert_eq!(event.job_id, id);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use tokio::sync::mpsc;

use crate::update::JobUpdate;

/// Create a connected publisher/receiver pair.
pub fn update_channel() -> (UpdatePublisher, UpdateReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (UpdatePublisher { sender }, UpdateReceiver { receiver })
}

/// Producer half. Cheap to clone; one per writer.
#[derive(Clone)]
pub struct UpdatePublisher {
    sender: mpsc::UnboundedSender<JobUpdate>,
}

impl UpdatePublisher {
    /// Enqueue an event without waiting.
    ///
    /// If the receiver has already been dropped (shutdown) the event is
    /// discarded.
    pub fn publish(&self, update: JobUpdate) {
        if let Err(mpsc::error::SendError(update)) = self.sender.send(update) {
            tracing::debug!(
                job_id = %update.job_id,
                status = %update.status,
                "Update channel closed, dropping event"
            );
        }
    }
}

/// Consumer half. Exactly one exists per channel.
pub struct UpdateReceiver {
    receiver: mpsc::UnboundedReceiver<JobUpdate>,
}

impl UpdateReceiver {
    /// Wait for the next event.
    ///
    /// Suspends the calling task while the queue is empty. Returns `None`
    /// once every [`UpdatePublisher`] has been dropped and the queue is
    /// drained.
    pub async fn recv(&mut self) -> Option<JobUpdate> {
        self.receiver.recv().await
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<JobUpdate> {
        self.receiver.try_recv().ok()
    }

    /// Take every event that is already queued, in order.
    pub fn drain(&mut self) -> Vec<JobUpdate> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
