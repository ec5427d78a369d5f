//! Error types for groundlink services

use thiserror::Error;

/// The main error type for service startup and lifecycle operations
#[derive(Error, Debug)]
pub enum Error {
    /// The config file exists in the configuration but could not be read
    #[error("config file {path} could not be read: {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The config file was read but does not contain a usable JSON object
    #[error("config file {path} could not be parsed: {reason}")]
    ConfigFileParse { path: String, reason: String },

    /// Required configuration parameters are absent from every source
    #[error(
        "missing parameters in configuration. The following parameters are required: {}. \
         Consider passing --dev during development",
        .0.join(", ")
    )]
    MissingConfig(Vec<String>),

    /// Bus handshake or authentication failure
    #[error("bus connection failed: {0}")]
    Connection(String),

    /// The health-check responder could not be registered
    #[error("health check registration failed: {0}")]
    HealthCheck(String),

    /// A configured path could not be resolved to an absolute path
    #[error("path {path} could not be resolved: {source}")]
    PathResolution {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A specialized Result type for groundlink operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
