//! Demo groundlink service
//!
//! Starts a service from the process arguments and environment, answers
//! echo requests on its own inbox subject, and shuts down cleanly on
//! interrupt.

use futures::StreamExt;
use groundlink_core::{logging, wait_for_interrupt, Error, Service, StartOptions};
use tracing::{info, warn};

fn usage() {
    eprintln!(
        "Usage: groundlink [options] [arg_0 ... arg_n]\n\n\
         Parameters:\n\
         \x20 --dev            start in development mode, filling missing parameters with defaults\n\
         \x20 --NATS_URL       URL of the NATS server the service connects to\n\
         \x20 --NATS_USER      username for the authentication with the server\n\
         \x20 --NATS_PASSWORD  password for the authentication with the server\n\
         \x20 --CONFIG_FILE    file path to the JSON config of the service\n\
         \x20 --CONFIG_KEY     object key of the config file that configures this service\n\
         \x20 --SERVICE_NAME   name of the service, also reported by the health check\n\
         \x20 --DATA_DIR       path where the service can store persistent data\n\n\
         Any other --KEY=VALUE pair is passed through to the service configuration."
    );
}

#[tokio::main]
async fn main() {
    logging::init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        usage();
        return;
    }

    if let Err(err) = run(args).await {
        eprintln!("error: {err:#}");
        if is_config_error(&err) {
            usage();
        }
        std::process::exit(1);
    }
}

fn is_config_error(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<Error>(),
        Some(
            Error::MissingConfig(_)
                | Error::ConfigFileRead { .. }
                | Error::ConfigFileParse { .. }
        )
    )
}

async fn run(args: Vec<String>) -> anyhow::Result<()> {
    let mut service = Service::start(StartOptions::new().with_args(args)).await?;

    info!(
        name = %service.service_name(),
        data_dir = %service.data_dir().display(),
        "service started"
    );
    println!(
        "{}",
        serde_json::to_string_pretty(service.config()).unwrap_or_default()
    );

    if let Some(client) = service.bus() {
        let inbox = format!("{}.inbox", service.service_name());
        let mut subscription = client.subscribe(inbox.clone()).await?;
        let client = client.clone();

        tokio::spawn(async move {
            while let Some(message) = subscription.next().await {
                info!(subject = %message.subject.as_str(), "inbox message received");
                if let Some(reply) = message.reply {
                    if let Err(err) = client.publish(reply, message.payload).await {
                        warn!("echo reply failed: {err}");
                    }
                }
            }
        });
        info!(subject = %inbox, "echoing requests on the inbox subject");
    }

    wait_for_interrupt().await?;
    info!("interrupt received, shutting down");

    service.drain().await?;
    service.close().await;
    Ok(())
}
