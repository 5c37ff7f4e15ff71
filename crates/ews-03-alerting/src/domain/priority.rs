//! Dispatch priority.
//!
//! Base by severity (HIGH 80, MEDIUM 50, LOW 30), plus a per-type bonus,
//! clamped to [1, 100].

use shared_types::{AlertSeverity, AlertType};

/// Priority floor and ceiling.
pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 100;

fn severity_base(severity: AlertSeverity) -> u8 {
    match severity {
        AlertSeverity::High => 80,
        AlertSeverity::Medium => 50,
        AlertSeverity::Low => 30,
    }
}

fn type_bonus(alert_type: AlertType) -> u8 {
    match alert_type {
        AlertType::EwsCritical => 20,
        AlertType::EwsUrgent => 15,
        AlertType::EwsElevated => 10,
        AlertType::SensorCritical => 18,
        AlertType::SensorWarning => 8,
        AlertType::EwsDataInconsistency => 0,
    }
}

/// Compute the dispatch priority for an alert.
#[must_use]
pub fn compute_priority(severity: AlertSeverity, alert_type: AlertType) -> u8 {
    (severity_base(severity) + type_bonus(alert_type)).clamp(MIN_PRIORITY, MAX_PRIORITY)
}

/// Raise a priority by the escalation bump, clamped.
#[must_use]
pub fn escalate_priority(priority: u8) -> u8 {
    priority.saturating_add(10).clamp(MIN_PRIORITY, MAX_PRIORITY)
}
