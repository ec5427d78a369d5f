//! Health-check responder
//!
//! Every service answers liveness probes on a well-known subject with its
//! own name, so operators can discover what is alive on the bus.

use async_nats::Client;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Well-known subject all services answer liveness probes on.
pub const HEALTH_SUBJECT: &str = "__groundlink__.health";

/// Body returned for any request on [`HEALTH_SUBJECT`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub errors: u32,
    pub name: String,
}

/// Subscribe to the health subject and answer probes with the service name.
///
/// The subscription is tied to the given connection and lives in a
/// background task; the returned handle is aborted when the connection is
/// released. Probes without a reply subject are ignored.
pub(crate) async fn register_health_check(
    client: &Client,
    service_name: &str,
) -> Result<JoinHandle<()>> {
    let status = HealthStatus {
        errors: 0,
        name: service_name.to_string(),
    };
    let payload = serde_json::to_vec(&status).map_err(|err| Error::HealthCheck(err.to_string()))?;

    let mut subscription = client
        .subscribe(HEALTH_SUBJECT)
        .await
        .map_err(|err| Error::HealthCheck(err.to_string()))?;

    let client = client.clone();
    let task = tokio::spawn(async move {
        while let Some(message) = subscription.next().await {
            let Some(reply) = message.reply else {
                debug!("health probe without reply subject, ignoring");
                continue;
            };
            if let Err(err) = client.publish(reply, payload.clone().into()).await {
                warn!("health response failed: {err}");
            }
        }
    });

    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_health_status_wire_shape() {
        let status = HealthStatus {
            errors: 0,
            name: "svc".to_string(),
        };

        let encoded = serde_json::to_value(&status).unwrap();
        assert_eq!(encoded, json!({"errors": 0, "name": "svc"}));
    }

    #[test]
    fn test_health_status_round_trips() {
        let decoded: HealthStatus =
            serde_json::from_str(r#"{"errors":0,"name":"svc"}"#).unwrap();
        assert_eq!(decoded.errors, 0);
        assert_eq!(decoded.name, "svc");
    }
}
