//! Herald job update channel.
//!
//! - [`JobUpdate`]: the lifecycle event envelope pushed to observers.
//! - [`update_channel`]: the unbounded FIFO queue between the lifecycle
//!   engine (many producers) and the notification fan-out (one consumer).

pub mod channel;
pub mod update;

pub use channel::{update_channel, UpdatePublisher, UpdateReceiver};
pub use update::{JobUpdate, UpdateKind};
