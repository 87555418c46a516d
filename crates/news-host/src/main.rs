//! News host binary entry point.
//!
//! Usage: news-host --port <port> --publisher-port <port> [--publisher-host <host>]

use anyhow::Context;
use clap::Parser;
use news_host::{Host, HostConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

/// News host: stores reporter submissions and forwards them to the publisher.
#[derive(Parser, Debug)]
#[command(name = "news-host")]
#[command(about = "Durable intake and forwarding of submitted news")]
struct Args {
    /// Port reporters connect to.
    #[arg(long, env = "NEWS_HOST_PORT")]
    port: u16,

    /// Publisher hostname.
    #[arg(long, env = "NEWS_PUBLISHER_HOST", default_value = "localhost")]
    publisher_host: String,

    /// Publisher port accepting publish calls.
    #[arg(long, env = "NEWS_PUBLISHER_PORT")]
    publisher_port: u16,

    /// Publisher registration port. Enables proxying of `register`.
    #[arg(long, env = "NEWS_PUBLISHER_REGISTER_PORT")]
    publisher_register_port: Option<u16>,

    /// SQLite database file.
    #[arg(long, env = "NEWS_DB_PATH", default_value = "news.db")]
    db: PathBuf,

    /// Idle wait between forwarding cycles in milliseconds.
    #[arg(long, env = "NEWS_POLL_INTERVAL_MS", default_value = "1000")]
    poll_interval_ms: u64,

    /// Upper bound of the retry backoff in milliseconds.
    #[arg(long, env = "NEWS_MAX_RETRY_DELAY_MS", default_value = "30000")]
    max_retry_delay_ms: u64,

    /// Connect and response timeout for publisher calls in seconds.
    #[arg(long, env = "NEWS_TIMEOUT_SECS", default_value = "5")]
    timeout_secs: u64,

    /// Reporter connections served at once.
    #[arg(long, env = "NEWS_MAX_CONNECTIONS", default_value = "64")]
    max_connections: usize,

    /// Seconds a silent reporter connection is kept open.
    #[arg(long, env = "NEWS_IDLE_TIMEOUT_SECS", default_value = "30")]
    idle_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> HostConfig {
        let mut config = HostConfig::new(self.port, self.publisher_host, self.publisher_port)
            .with_timeout(Duration::from_secs(self.timeout_secs));
        config.publisher_register_port = self.publisher_register_port;
        config.db_path = self.db;
        config.max_connections = self.max_connections;
        config.idle_timeout = Duration::from_secs(self.idle_timeout_secs);
        config.forwarder.poll_interval = Duration::from_millis(self.poll_interval_ms);
        config.forwarder.initial_retry_delay = Duration::from_millis(self.poll_interval_ms);
        config.forwarder.max_retry_delay = Duration::from_millis(self.max_retry_delay_ms);
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    observability::init_with_config(observability::LogConfig {
        service_name: "news-host".into(),
        default_level: args.log_level.clone(),
        ..Default::default()
    });

    let config = args.into_config();
    info!(
        port = config.listen_port,
        publisher = %config.publisher_addr(),
        registrar = ?config.registrar_addr(),
        db = %config.db_path.display(),
        "Configuration loaded"
    );

    let host = Host::new(config)
        .await
        .context("failed to start news host")?;

    tokio::select! {
        result = host.run() => {
            if let Err(e) = result {
                error!(error = %e, "Host exited with error");
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, exiting...");
            host.shutdown();
        }
    }

    Ok(())
}
