//! Bus connectivity: connection lifecycle and health checks

pub mod connection;
pub mod health;

pub use connection::{BusManager, ConnectionState};
pub use health::{HealthStatus, HEALTH_SUBJECT};
