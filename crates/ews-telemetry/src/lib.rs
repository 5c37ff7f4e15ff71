//! # EWS Telemetry
//!
//! Observability bootstrap for the VitalMesh services.
//!
//! ## Components
//!
//! - Structured logging via `tracing-subscriber` (console or JSON)
//! - Prometheus metrics for the pipeline counters
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ews_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(&config).expect("Failed to init telemetry");
//!
//!     // Application code here; logs and metrics are now collected.
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `EWS_SERVICE_NAME` | `vitalmesh` | Service name stamped on log lines |
//! | `EWS_JSON_LOGS` | `false` (true in containers) | JSON log output |
//! | `EWS_METRICS_PORT` | `9100` | Prometheus scrape port |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::LoggingGuard;
pub use metrics::{
    register_metrics, MetricsHandle, ALERTS_RAISED, BUS_MESSAGES_PUBLISHED, BUS_MESSAGES_RECEIVED,
    NOTIFICATIONS_FAILED, NOTIFICATIONS_SENT, READINGS_INGESTED, READ_MODEL_UPDATES,
    SCORES_CALCULATED, SCORE_CONSENSUS_ROUNDS, SENSOR_CONSENSUS_ROUNDS, SERVICE_ERRORS,
};

use thiserror::Error;

/// Telemetry initialization errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that must be held for the lifetime of the application;
/// dropping it flushes pending log output.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics_handle = register_metrics()?;
    let logging_guard = logging::init_logging(config)?;

    Ok(TelemetryGuard {
        _logging: logging_guard,
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active. Drop to flush and shut down.
pub struct TelemetryGuard {
    _logging: LoggingGuard,
    _metrics: MetricsHandle,
}
