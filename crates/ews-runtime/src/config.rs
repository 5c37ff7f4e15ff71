//! # Runtime Configuration
//!
//! Unified configuration for all services and runtime parameters, read
//! from the environment with sane defaults for development.

use std::env;

/// Deployment environment. Selects the broker fallback policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEnv {
    /// Local development: an unreachable broker falls back to the
    /// in-memory bus.
    Development,
    /// Production: the broker is required; no silent fallback.
    Production,
}

impl NodeEnv {
    fn parse(raw: &str) -> Self {
        match raw {
            "production" => Self::Production,
            _ => Self::Development,
        }
    }

    /// Whether the in-memory bus may stand in for the broker.
    #[must_use]
    pub fn broker_fallback_permitted(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// SMTP transport settings, handed to the email channel adapter.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub secure: bool,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            secure: false,
            user: None,
            password: None,
            from: "alerts@vitalmesh.local".to_string(),
            from_name: "VitalMesh Alerts".to_string(),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listening port for the API edge.
    pub port: u16,
    /// Deployment environment.
    pub node_env: NodeEnv,
    /// Document store connection string.
    pub mongodb_uri: String,
    /// Message broker connection string.
    pub amqp_url: String,
    /// Log level filter.
    pub log_level: String,
    /// Base URL of the scoring service (ingestion's trigger target).
    pub ews_service_url: String,
    /// Base URL of the alert service.
    pub alert_service_url: String,
    /// Email transport settings.
    pub email: EmailConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            node_env: NodeEnv::Development,
            mongodb_uri: "mongodb://localhost:27017/ews".to_string(),
            amqp_url: "amqp://localhost:5672".to_string(),
            log_level: "info".to_string(),
            ews_service_url: "http://localhost:3001".to_string(),
            alert_service_url: "http://localhost:3002".to_string(),
            email: EmailConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// Recognised variables: `PORT`, `NODE_ENV`, `MONGODB_URI`,
    /// `AMQP_URL`, `LOG_LEVEL`, `EWS_SERVICE_URL`, `ALERT_ENGINE_URL` /
    /// `ALERT_SERVICE_URL`, `EMAIL_HOST|PORT|SECURE|USER|PASSWORD|FROM|FROM_NAME`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: env_parse("PORT", defaults.port),
            node_env: NodeEnv::parse(
                &env::var("NODE_ENV").unwrap_or_else(|_| "development".to_string()),
            ),
            mongodb_uri: env::var("MONGODB_URI").unwrap_or(defaults.mongodb_uri),
            amqp_url: env::var("AMQP_URL").unwrap_or(defaults.amqp_url),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            ews_service_url: env::var("EWS_SERVICE_URL").unwrap_or(defaults.ews_service_url),
            alert_service_url: env::var("ALERT_ENGINE_URL")
                .or_else(|_| env::var("ALERT_SERVICE_URL"))
                .unwrap_or(defaults.alert_service_url),
            email: EmailConfig {
                host: env::var("EMAIL_HOST").unwrap_or(defaults.email.host),
                port: env_parse("EMAIL_PORT", defaults.email.port),
                secure: env::var("EMAIL_SECURE")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(defaults.email.secure),
                user: env::var("EMAIL_USER").ok(),
                password: env::var("EMAIL_PASSWORD").ok(),
                from: env::var("EMAIL_FROM").unwrap_or(defaults.email.from),
                from_name: env::var("EMAIL_FROM_NAME").unwrap_or(defaults.email.from_name),
            },
        }
    }

    /// Production readiness check.
    ///
    /// # Errors
    ///
    /// Production refuses to start without an explicit broker and store:
    /// the in-memory fallback is a development convenience only.
    pub fn validate_for_production(&self) -> Result<(), String> {
        if self.node_env != NodeEnv::Production {
            return Ok(());
        }
        if env::var("AMQP_URL").is_err() {
            return Err("NODE_ENV=production requires AMQP_URL to be set".to_string());
        }
        if env::var("MONGODB_URI").is_err() {
            return Err("NODE_ENV=production requires MONGODB_URI to be set".to_string());
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
