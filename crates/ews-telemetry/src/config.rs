//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name stamped on log lines.
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error).
    pub log_level: String,

    /// Whether to emit JSON formatted logs.
    pub json_logs: bool,

    /// Prometheus metrics port.
    pub metrics_port: u16,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "vitalmesh".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            metrics_port: 9100,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `EWS_SERVICE_NAME`: Service name (default: vitalmesh)
    /// - `LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `EWS_JSON_LOGS`: JSON logs (default: false, true in containers)
    /// - `EWS_METRICS_PORT`: Prometheus metrics port (default: 9100)
    #[must_use]
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("EWS_SERVICE_NAME").unwrap_or_else(|_| "vitalmesh".to_string()),

            log_level: env::var("LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("EWS_JSON_LOGS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(is_container),

            metrics_port: env::var("EWS_METRICS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(9100),
        }
    }
}
