//! Core building blocks for groundlink services
//!
//! This crate assembles a service's runtime configuration from layered
//! sources (caller overrides, CLI tokens, environment, development defaults,
//! JSON config file), validates the minimal required schema, and manages the
//! lifecycle of the underlying NATS connection, including health-check
//! registration and graceful shutdown.

pub mod bus;
pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod utils;

pub use bus::{ConnectionState, HealthStatus, HEALTH_SUBJECT};
pub use config::{CustomConfig, RawConfigMap, ResolvedConfig};
pub use error::{Error, Result};
pub use service::{Service, StartOptions};
pub use utils::wait_for_interrupt;
