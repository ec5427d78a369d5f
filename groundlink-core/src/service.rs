//! Service startup and lifecycle
//!
//! [`Service::start`] runs the whole bootstrap in a strict order: apply the
//! startup options, assemble and validate the configuration, resolve the
//! data directory, then bring up bus connectivity. Any failure aborts with
//! an error and no partially usable handle.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_nats::Client;
use tracing::debug;

use crate::bus::{BusManager, ConnectionState};
use crate::config::{assemble_config, ResolvedConfig};
use crate::error::{Error, Result};

/// Startup options, applied before the configuration pipeline runs.
///
/// Replaces hidden ordering between option modifiers with one explicit
/// struct: disabling the bus discards any injected connection, injecting a
/// connection re-enables the bus.
pub struct StartOptions {
    bus: bool,
    overrides: HashMap<String, String>,
    connection: Option<Client>,
    args: Option<Vec<String>>,
    env: Option<Vec<(String, String)>>,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            bus: true,
            overrides: HashMap::new(),
            connection: None,
            args: None,
            env: None,
        }
    }
}

impl StartOptions {
    /// Default options: bus enabled, no overrides, process arguments and
    /// environment as reader inputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip bus initialization entirely. Discards any injected connection.
    pub fn without_bus(mut self) -> Self {
        self.bus = false;
        self.connection = None;
        self
    }

    /// Configuration parameters with precedence over every other source.
    pub fn with_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    /// Add a single override parameter.
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Use an externally managed bus connection instead of creating one.
    ///
    /// Implies bus connectivity. The connection stays under caller
    /// ownership and is never closed by the service.
    pub fn with_connection(mut self, client: Client) -> Self {
        self.connection = Some(client);
        self.bus = true;
        self
    }

    /// Explicit command line tokens for the CLI reader instead of the
    /// process arguments.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = Some(args);
        self
    }

    /// Explicit environment snapshot for the environment reader instead of
    /// the process environment.
    pub fn with_env(mut self, vars: Vec<(String, String)>) -> Self {
        self.env = Some(vars);
        self
    }
}

/// A started service: assembled configuration plus bus connectivity.
///
/// Must not be used after [`Service::close`].
#[derive(Debug)]
pub struct Service {
    bus: BusManager,
    config: ResolvedConfig,
    data_dir: PathBuf,
    service_name: String,
}

impl Service {
    /// Start a service with the given options.
    pub async fn start(options: StartOptions) -> Result<Self> {
        let args: Vec<String> = options
            .args
            .unwrap_or_else(|| std::env::args().skip(1).collect());
        let vars: Vec<(String, String)> = options.env.unwrap_or_else(|| std::env::vars().collect());

        let config = assemble_config(&options.overrides, &args, &vars)?;

        let data_dir =
            std::path::absolute(&config.data_dir).map_err(|source| Error::PathResolution {
                path: config.data_dir.clone(),
                source,
            })?;

        let mut bus = BusManager::new();
        if options.bus {
            bus.start(&config, options.connection).await?;
        } else {
            debug!("bus connectivity disabled");
        }

        Ok(Self {
            bus,
            service_name: config.service_name.clone(),
            data_dir,
            config,
        })
    }

    /// The bus client, or `None` when connectivity is disabled.
    pub fn bus(&self) -> Option<&Client> {
        self.bus.client()
    }

    /// Current lifecycle state of the bus connection.
    pub fn connection_state(&self) -> ConnectionState {
        self.bus.state()
    }

    /// The assembled configuration from all available sources.
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Absolute path to the data directory of the service.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The name of the service, as reported by the health check.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Flush outstanding outbound messages. Closes an owned connection,
    /// leaves an injected one open for its owner. Idempotent.
    pub async fn drain(&mut self) -> Result<()> {
        self.bus.drain().await
    }

    /// Release bus resources. Idempotent; the handle must not be used
    /// afterwards.
    pub async fn close(&mut self) {
        self.bus.close().await
    }
}
