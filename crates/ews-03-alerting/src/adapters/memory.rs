//! In-memory store adapters.

use crate::domain::{
    Alert, AlertQuery, Notification, NotificationQuery, Subscription,
};
use crate::ports::{AlertStore, NotificationStore, SubscriptionStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory alert store.
#[derive(Default)]
pub struct InMemoryAlertStore {
    alerts: RwLock<HashMap<Uuid, Alert>>,
}

impl InMemoryAlertStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AlertStore for InMemoryAlertStore {
    async fn insert_alert(&self, alert: Alert) -> Result<(), String> {
        self.alerts.write().insert(alert.alert_id, alert);
        Ok(())
    }

    async fn get(&self, alert_id: Uuid) -> Result<Option<Alert>, String> {
        Ok(self.alerts.read().get(&alert_id).cloned())
    }

    async fn update(&self, alert: Alert) -> Result<(), String> {
        let mut alerts = self.alerts.write();
        if !alerts.contains_key(&alert.alert_id) {
            return Err(format!("alert {} not stored", alert.alert_id));
        }
        alerts.insert(alert.alert_id, alert);
        Ok(())
    }

    async fn list(&self, query: &AlertQuery) -> Result<Vec<Alert>, String> {
        let mut matching: Vec<Alert> = self
            .alerts
            .read()
            .values()
            .filter(|a| {
                query
                    .patient_id
                    .as_ref()
                    .map_or(true, |p| &a.patient_id == p)
            })
            .filter(|a| query.status.map_or(true, |s| a.status == s))
            .filter(|a| query.severity.map_or(true, |s| a.alert_severity == s))
            .filter(|a| query.from.map_or(true, |from| a.created_at >= from))
            .filter(|a| query.to.map_or(true, |to| a.created_at <= to))
            .cloned()
            .collect();

        // Highest priority first, newest breaking ties.
        matching.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(b.created_at.cmp(&a.created_at))
        });

        let offset = query.offset.unwrap_or(0);
        let matching: Vec<Alert> = matching.into_iter().skip(offset).collect();
        Ok(match query.limit {
            Some(limit) => matching.into_iter().take(limit).collect(),
            None => matching,
        })
    }
}

/// In-memory subscription store.
#[derive(Default)]
pub struct InMemorySubscriptionStore {
    subscriptions: RwLock<HashMap<Uuid, Subscription>>,
}

impl InMemorySubscriptionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn insert_subscription(&self, subscription: Subscription) -> Result<(), String> {
        self.subscriptions
            .write()
            .insert(subscription.subscription_id, subscription);
        Ok(())
    }

    async fn get(&self, subscription_id: Uuid) -> Result<Option<Subscription>, String> {
        Ok(self.subscriptions.read().get(&subscription_id).cloned())
    }

    async fn update(&self, subscription: Subscription) -> Result<(), String> {
        self.subscriptions
            .write()
            .insert(subscription.subscription_id, subscription);
        Ok(())
    }

    async fn delete(&self, subscription_id: Uuid) -> Result<bool, String> {
        Ok(self
            .subscriptions
            .write()
            .remove(&subscription_id)
            .is_some())
    }

    async fn all(&self) -> Result<Vec<Subscription>, String> {
        Ok(self.subscriptions.read().values().cloned().collect())
    }
}

/// In-memory notification store.
#[derive(Default)]
pub struct InMemoryNotificationStore {
    notifications: RwLock<HashMap<Uuid, Notification>>,
}

impl InMemoryNotificationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert_notification(&self, notification: Notification) -> Result<(), String> {
        self.notifications
            .write()
            .insert(notification.notification_id, notification);
        Ok(())
    }

    async fn get(&self, notification_id: Uuid) -> Result<Option<Notification>, String> {
        Ok(self.notifications.read().get(&notification_id).cloned())
    }

    async fn update(&self, notification: Notification) -> Result<(), String> {
        let mut notifications = self.notifications.write();
        if !notifications.contains_key(&notification.notification_id) {
            return Err(format!(
                "notification {} not stored",
                notification.notification_id
            ));
        }
        notifications.insert(notification.notification_id, notification);
        Ok(())
    }

    async fn list(&self, query: &NotificationQuery) -> Result<Vec<Notification>, String> {
        let mut matching: Vec<Notification> = self
            .notifications
            .read()
            .values()
            .filter(|n| query.alert_id.map_or(true, |id| n.alert_id == id))
            .filter(|n| {
                query
                    .patient_id
                    .as_ref()
                    .map_or(true, |p| &n.patient_id == p)
            })
            .filter(|n| query.status.map_or(true, |s| n.status == s))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = query.limit {
            matching.truncate(limit);
        }
        Ok(matching)
    }
}
