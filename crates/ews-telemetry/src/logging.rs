//! Structured logging initialisation.
//!
//! Console output for development, JSON for container deployments. The
//! filter honours `LOG_LEVEL`/`RUST_LOG` through [`TelemetryConfig`].

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Guard returned by [`init_logging`]. Held by the application root;
/// nothing to flush for the console/JSON writers, but keeping a guard
/// preserves the option of buffered writers without an API change.
pub struct LoggingGuard {
    _private: (),
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed or the filter
/// directive in the configuration cannot be parsed.
pub fn init_logging(config: &TelemetryConfig) -> Result<LoggingGuard, TelemetryError> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::LoggingInit(format!("bad log filter: {e}")))?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json_logs {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        level = %config.log_level,
        json = config.json_logs,
        "Logging initialised"
    );

    Ok(LoggingGuard { _private: () })
}
