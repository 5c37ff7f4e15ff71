//! # EWS Runtime
//!
//! The application root: reads configuration, constructs the event bus,
//! stores and services, wires the choreography, and owns every lifecycle.
//!
//! The event bus is an explicit adapter object constructed here and
//! injected into each service; nothing holds process-wide singletons, and
//! dropping the container closes subscriptions deterministically.

pub mod adapters;
pub mod config;
pub mod container;
pub mod wiring;

pub use config::{AppConfig, EmailConfig, NodeEnv};
pub use container::Container;
