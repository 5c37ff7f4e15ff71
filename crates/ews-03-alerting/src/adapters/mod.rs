//! Adapters for the alerting service: in-memory stores, channel adapters
//! and the JSON api handler.

mod api_handler;
mod channels;
mod memory;

pub use api_handler::AlertApiHandler;
pub use channels::{LogChannel, RecordingChannel};
pub use memory::{InMemoryAlertStore, InMemoryNotificationStore, InMemorySubscriptionStore};
