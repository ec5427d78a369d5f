//! Bus connection lifecycle management

use async_nats::{Client, ConnectOptions};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::bus::health::register_health_check;
use crate::config::ResolvedConfig;
use crate::error::{Error, Result};

/// Lifecycle states of the managed bus connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection yet, or connectivity disabled for good
    Uninitialized,
    /// Handshake in progress
    Connecting,
    /// Connected, health responder registered
    Ready,
    /// Flushing outstanding outbound messages
    Draining,
    /// Connection released; terminal
    Closed,
}

/// Manages at most one bus connection, either created here or injected by
/// the caller.
///
/// An injected connection stays under caller ownership: it is flushed on
/// drain but never closed by the manager. A connection created here is owned
/// exclusively and closed on drain/close and on startup failure.
#[derive(Debug)]
pub struct BusManager {
    client: Option<Client>,
    owned: bool,
    state: ConnectionState,
    health_task: Option<JoinHandle<()>>,
}

impl BusManager {
    /// A manager with no connection. Stays [`ConnectionState::Uninitialized`]
    /// until [`BusManager::start`] is driven.
    pub(crate) fn new() -> Self {
        Self {
            client: None,
            owned: false,
            state: ConnectionState::Uninitialized,
            health_task: None,
        }
    }

    /// Establish connectivity: connect (or adopt the injected client) and
    /// register the health responder.
    ///
    /// On failure the manager ends up [`ConnectionState::Closed`]; a
    /// connection created here is closed before the error propagates, an
    /// injected one is left to its owner.
    pub(crate) async fn start(
        &mut self,
        config: &ResolvedConfig,
        injected: Option<Client>,
    ) -> Result<()> {
        let (client, owned) = match injected {
            Some(client) => {
                debug!("adopting externally managed bus connection");
                (client, false)
            }
            None => {
                self.state = ConnectionState::Connecting;
                match Self::connect(config).await {
                    Ok(client) => (client, true),
                    Err(err) => {
                        self.state = ConnectionState::Closed;
                        return Err(err);
                    }
                }
            }
        };

        match register_health_check(&client, &config.service_name).await {
            Ok(task) => {
                self.client = Some(client);
                self.owned = owned;
                self.health_task = Some(task);
                self.state = ConnectionState::Ready;
                info!(service = %config.service_name, "bus connection ready");
                Ok(())
            }
            Err(err) => {
                if owned {
                    let _ = client.drain().await;
                }
                self.state = ConnectionState::Closed;
                Err(err)
            }
        }
    }

    async fn connect(config: &ResolvedConfig) -> Result<Client> {
        debug!(url = %config.nats_url, "connecting to bus");

        let options = match (&config.nats_user, &config.nats_password) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                ConnectOptions::new().user_and_password(user.clone(), password.clone())
            }
            // anything less than a full credential pair means anonymous auth
            _ => ConnectOptions::new(),
        };

        options
            .connect(config.nats_url.as_str())
            .await
            .map_err(|err| Error::Connection(err.to_string()))
    }

    /// The bus client, if connectivity was established.
    pub(crate) fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Flush outstanding outbound messages; an owned connection is closed
    /// afterwards, an injected one is left open for its owner.
    ///
    /// Idempotent and a no-op when no connection exists.
    pub(crate) async fn drain(&mut self) -> Result<()> {
        let Some(client) = self.client.as_ref() else {
            return Ok(());
        };

        self.state = ConnectionState::Draining;
        client
            .flush()
            .await
            .map_err(|err| Error::Connection(err.to_string()))?;

        if self.owned {
            self.stop_health_task();
            if let Some(client) = self.client.take() {
                client
                    .drain()
                    .await
                    .map_err(|err| Error::Connection(err.to_string()))?;
            }
            self.state = ConnectionState::Closed;
            debug!("bus connection drained and closed");
        } else {
            debug!("injected bus connection flushed, left open for its owner");
        }

        Ok(())
    }

    /// Release the connection without waiting for outstanding messages.
    /// An injected connection is only let go of, never closed.
    ///
    /// Idempotent and a no-op when no connection exists.
    pub(crate) async fn close(&mut self) {
        self.stop_health_task();
        let Some(client) = self.client.take() else {
            return;
        };

        if self.owned {
            if let Err(err) = client.drain().await {
                debug!("error while closing bus connection: {err}");
            }
        }
        self.state = ConnectionState::Closed;
    }

    fn stop_health_task(&mut self) {
        if let Some(task) = self.health_task.take() {
            task.abort();
        }
    }
}
