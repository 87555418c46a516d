//! News subscriber binary entry point.
//!
//! Usage: news-subscriber --port <port> --publisher-port <port> [--publisher-host <host>]

use anyhow::Context;
use clap::Parser;
use news_subscriber::{Subscriber, SubscriberConfig};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info};

/// News subscriber: prints every item the publisher pushes.
#[derive(Parser, Debug)]
#[command(name = "news-subscriber")]
#[command(about = "Receive pushed news from the publisher")]
struct Args {
    /// Local UDP port to receive on.
    #[arg(long, env = "NEWS_SUBSCRIBER_PORT")]
    port: u16,

    /// Publisher hostname.
    #[arg(long, env = "NEWS_PUBLISHER_HOST", default_value = "localhost")]
    publisher_host: String,

    /// Publisher registration port.
    #[arg(long, env = "NEWS_PUBLISHER_REGISTER_PORT")]
    publisher_port: u16,

    /// Host part of the address given to the publisher.
    #[arg(long, env = "NEWS_SUBSCRIBER_ADVERTISE_HOST", default_value = "127.0.0.1")]
    advertise_host: String,

    /// Registration call timeout in seconds.
    #[arg(long, default_value = "5")]
    timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    observability::init_with_config(observability::LogConfig {
        service_name: "news-subscriber".into(),
        default_level: args.log_level.clone(),
        ..Default::default()
    });

    let mut config = SubscriberConfig::new(args.port, args.publisher_host, args.publisher_port);
    config.advertise_host = args.advertise_host;
    config.client.connect_timeout = Duration::from_secs(args.timeout_secs);
    config.client.response_timeout = Duration::from_secs(args.timeout_secs);

    let subscriber = Subscriber::bind(config)
        .await
        .context("failed to bind subscriber port")?;
    subscriber
        .register()
        .await
        .context("failed to register with publisher")?;

    let (tx, mut rx) = mpsc::channel(64);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let printer = tokio::spawn(async move {
        while let Some(item) = rx.recv().await {
            println!("DATA: {}", item);
        }
    });

    tokio::select! {
        result = subscriber.run(tx, shutdown_rx) => {
            if let Err(e) = result {
                error!(error = %e, "Subscriber exited with error");
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, exiting...");
            let _ = shutdown_tx.send(());
        }
    }

    let _ = printer.await;
    Ok(())
}
