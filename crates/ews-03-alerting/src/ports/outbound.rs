//! Driven ports (outbound dependencies).

use crate::domain::{
    Alert, AlertQuery, ChannelKind, Notification, NotificationQuery, Subscription,
};
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence for alerts.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Persist a new alert.
    async fn insert_alert(&self, alert: Alert) -> Result<(), String>;

    /// Fetch one alert.
    async fn get(&self, alert_id: Uuid) -> Result<Option<Alert>, String>;

    /// Replace a stored alert (lifecycle updates, notification refs).
    async fn update(&self, alert: Alert) -> Result<(), String>;

    /// List alerts with filters, highest priority first.
    async fn list(&self, query: &AlertQuery) -> Result<Vec<Alert>, String>;
}

/// Persistence for subscriptions.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Persist a new subscription.
    async fn insert_subscription(&self, subscription: Subscription) -> Result<(), String>;

    /// Fetch one subscription.
    async fn get(&self, subscription_id: Uuid) -> Result<Option<Subscription>, String>;

    /// Replace a stored subscription.
    async fn update(&self, subscription: Subscription) -> Result<(), String>;

    /// Delete a subscription.
    async fn delete(&self, subscription_id: Uuid) -> Result<bool, String>;

    /// All subscriptions (matching filters them in the domain).
    async fn all(&self) -> Result<Vec<Subscription>, String>;
}

/// Persistence for notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist a new notification.
    async fn insert_notification(&self, notification: Notification) -> Result<(), String>;

    /// Fetch one notification.
    async fn get(&self, notification_id: Uuid) -> Result<Option<Notification>, String>;

    /// Replace a stored notification (state transitions update in place).
    async fn update(&self, notification: Notification) -> Result<(), String>;

    /// List notifications with filters, newest first.
    async fn list(&self, query: &NotificationQuery) -> Result<Vec<Notification>, String>;
}

/// A delivery channel adapter (email, SMS, push). Transports are external
/// collaborators; in-tree adapters log or record.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Which channel kind this adapter serves.
    fn kind(&self) -> ChannelKind;

    /// Hand a notification to the transport. An `Err` marks the
    /// notification FAILED with the message.
    async fn deliver(&self, notification: &Notification) -> Result<(), String>;
}

/// Event bus for choreography.
#[async_trait]
pub trait AlertEventBus: Send + Sync {
    /// Announce a raised alert.
    async fn publish_alert_raised(&self, alert: &Alert) -> Result<(), String>;
}
