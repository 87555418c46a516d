//! News publisher binary entry point.
//!
//! Usage: news-publisher --register-port <port> --publish-port <port>

use anyhow::Context;
use clap::Parser;
use news_publisher::{Publisher, PublisherConfig};
use tracing::{error, info};

/// News publisher: fans published items out to registered subscribers.
#[derive(Parser, Debug)]
#[command(name = "news-publisher")]
#[command(about = "Subscription registry and datagram fan-out")]
struct Args {
    /// Port subscribers register on.
    #[arg(long, env = "NEWS_PUBLISHER_REGISTER_PORT")]
    register_port: u16,

    /// Port hosts publish to.
    #[arg(long, env = "NEWS_PUBLISHER_PORT")]
    publish_port: u16,

    /// Connections served at once on each port.
    #[arg(long, default_value = "64")]
    max_connections: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    observability::init_with_config(observability::LogConfig {
        service_name: "news-publisher".into(),
        default_level: args.log_level.clone(),
        ..Default::default()
    });

    let config = PublisherConfig {
        max_connections: args.max_connections,
        ..PublisherConfig::new(args.register_port, args.publish_port)
    };
    info!(
        register_port = config.register_port,
        publish_port = config.publish_port,
        "Configuration loaded"
    );

    let publisher = Publisher::new(config)
        .await
        .context("failed to start news publisher")?;

    tokio::select! {
        result = publisher.run() => {
            if let Err(e) = result {
                error!(error = %e, "Publisher exited with error");
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, exiting...");
            publisher.shutdown();
        }
    }

    Ok(())
}
