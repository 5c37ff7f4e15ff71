//! # Core Identifiers
//!
//! Natural-key identifiers shared by every service, plus the service
//! identity used in envelopes and event filters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a monitored patient (natural key from the ward system).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct PatientId(pub String);

impl PatientId {
    /// Create a patient id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PatientId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier of an edge node (a sensor-collecting device).
///
/// Multiple edge nodes may observe the same patient concurrently; consensus
/// keeps at most the latest reading per node within a window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The three cooperating services (plus the runtime root).
///
/// Used as the envelope `source` and for event-bus filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceId {
    /// Application root (wiring, bootstrap events).
    Runtime,
    /// Ingestion & sensor-consensus service.
    Ingestion,
    /// EWS scoring & score-consensus service.
    Scoring,
    /// Alert dispatch service.
    Alerting,
}

impl ServiceId {
    /// Stable short name used in logs and queue metadata.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Runtime => "runtime",
            Self::Ingestion => "ingestion",
            Self::Scoring => "scoring",
            Self::Alerting => "alerting",
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
