//! # EWS-03 Alerting - Prioritisation & Dispatch Service
//!
//! ## Purpose
//!
//! Classifies consensus outcomes into alerts, computes dispatch priority,
//! matches subscriptions, and delivers notifications with a per-record
//! lifecycle state machine.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Priority always within [1, 100] | `domain/priority.rs` - clamp |
//! | INVARIANT-2 | One alert at most per consensus outcome | `domain/classify.rs` - total mapping |
//! | INVARIANT-3 | Acknowledge only from NEW/ESCALATED | `domain/alert.rs` - `acknowledge()` |
//! | INVARIANT-4 | Resolve/escalate rejected on RESOLVED | `domain/alert.rs` |
//! | INVARIANT-5 | Notification id names recipient+content, not attempt | `domain/notification.rs` - `resend()` |
//! | INVARIANT-6 | A subscription carries at least one channel | `domain/subscription.rs` - `validate()` |
//!
//! ## Choreography
//!
//! ```text
//! [Event Bus] ──ews.consensus──→ ALERTING (3)
//!                                   │
//!                                   ├─ classify → priority
//!                                   ├─ match subscriptions
//!                                   ├─ compose + deliver per channel
//!                                   └──AlertRaised──→ [Event Bus]
//! ```
//!
//! Alert → Notification ownership is one-way by id reference; the
//! notification carries `alert_id` as a foreign key and no back-pointer.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{
    AlertApiHandler, InMemoryAlertStore, InMemoryNotificationStore, InMemorySubscriptionStore,
    LogChannel, RecordingChannel,
};
pub use domain::{
    classify_score_consensus, classify_sensor_consensus, compute_priority, escalate_priority,
    Alert, AlertError, AlertQuery, AlertResult, AlertStatus, ChannelKind, Classification,
    CreateAlert, Notification, NotificationQuery, NotificationStatus, SubscriberType, Subscription,
    SubscriptionChannel,
};
pub use ports::{
    AlertApi, AlertEventBus, AlertStore, NotificationChannel, NotificationStore, SubscriptionStore,
};
pub use service::{AlertDependencies, AlertService, NotificationDispatcher};
