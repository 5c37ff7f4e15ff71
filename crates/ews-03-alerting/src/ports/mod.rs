//! Ports for the alerting service.

pub mod inbound;
pub mod outbound;

pub use inbound::AlertApi;
pub use outbound::{
    AlertEventBus, AlertStore, NotificationChannel, NotificationStore, SubscriptionStore,
};
