//! Job update fan-out.
//!
//! [`UpdateFanout`] drains the update channel and pushes every event to
//! all WebSocket observers.

pub mod fanout;

pub use fanout::UpdateFanout;
