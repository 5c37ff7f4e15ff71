//! Driving ports (inbound API).

use crate::domain::{
    Alert, AlertQuery, AlertResult, CreateAlert, Notification, NotificationQuery, Subscription,
};
use async_trait::async_trait;
use shared_types::{ScoreConsensus, SensorConsensus};
use uuid::Uuid;

/// Primary alerting API.
#[async_trait]
pub trait AlertApi: Send + Sync {
    /// Create an alert, match subscriptions and dispatch notifications.
    async fn create_alert(&self, command: CreateAlert) -> AlertResult<Alert>;

    /// Classify a score consensus and raise the resulting alert, if any.
    async fn handle_score_consensus(
        &self,
        consensus: &ScoreConsensus,
    ) -> AlertResult<Option<Alert>>;

    /// Classify a sensor consensus and raise the resulting alert, if any.
    async fn handle_sensor_consensus(
        &self,
        consensus: &SensorConsensus,
    ) -> AlertResult<Option<Alert>>;

    /// List alerts, highest priority first.
    async fn list_alerts(&self, query: AlertQuery) -> AlertResult<Vec<Alert>>;

    /// Fetch one alert.
    async fn get_alert(&self, alert_id: Uuid) -> AlertResult<Option<Alert>>;

    /// Acknowledge an alert (NEW/ESCALATED only).
    async fn acknowledge(&self, alert_id: Uuid, user_id: &str) -> AlertResult<Alert>;

    /// Resolve an alert (rejected when already resolved).
    async fn resolve(
        &self,
        alert_id: Uuid,
        user_id: &str,
        resolution: Option<String>,
    ) -> AlertResult<Alert>;

    /// Escalate an alert: lift status and priority, re-notify the
    /// escalation tier. Rejected when resolved.
    async fn escalate(&self, alert_id: Uuid, reason: Option<String>) -> AlertResult<Alert>;

    /// Create a subscription (validated: at least one channel).
    async fn create_subscription(&self, subscription: Subscription) -> AlertResult<Subscription>;

    /// Fetch one subscription.
    async fn get_subscription(&self, subscription_id: Uuid) -> AlertResult<Option<Subscription>>;

    /// Replace a subscription.
    async fn update_subscription(&self, subscription: Subscription) -> AlertResult<Subscription>;

    /// Delete a subscription.
    async fn delete_subscription(&self, subscription_id: Uuid) -> AlertResult<()>;

    /// All subscriptions.
    async fn list_subscriptions(&self) -> AlertResult<Vec<Subscription>>;

    /// List notifications, newest first.
    async fn list_notifications(
        &self,
        query: NotificationQuery,
    ) -> AlertResult<Vec<Notification>>;

    /// Resend a notification (FAILED/PENDING only); the record keeps its
    /// id and content and goes through delivery again.
    async fn resend_notification(&self, notification_id: Uuid) -> AlertResult<Notification>;
}
