//! News reporter binary entry point.
//!
//! Usage: news-reporter <host> <port> [source headline...]

use clap::Parser;
use news_reporter::Reporter;
use std::io::{self, BufReader};
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

/// News reporter: submits news items to a news host.
#[derive(Parser, Debug)]
#[command(name = "news-reporter")]
#[command(about = "Submit news items to a news host")]
struct Args {
    /// News host name or address.
    host: String,

    /// News host port.
    port: u16,

    /// Source followed by the headline words. Prompts interactively when
    /// omitted.
    #[arg(num_args = 2.., value_name = "SOURCE HEADLINE")]
    post: Vec<String>,

    /// Connect and response timeout in seconds.
    #[arg(long, default_value = "10")]
    timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    observability::init_with_config(observability::LogConfig {
        service_name: "news-reporter".into(),
        default_level: args.log_level.clone(),
        ..Default::default()
    });

    let reporter = Reporter::with_timeout(
        &args.host,
        args.port,
        Duration::from_secs(args.timeout_secs),
    );

    if let Some((source, words)) = args.post.split_first() {
        let headline = words.join(" ");
        if reporter.add_post(source, &headline).await {
            println!("Added news post successfully");
            return Ok(ExitCode::SUCCESS);
        }
        println!("Failed to add news post");
        return Ok(ExitCode::FAILURE);
    }

    let summary = news_reporter::interactive(
        &reporter,
        BufReader::new(io::stdin()),
        io::stdout(),
    )
    .await?;
    info!(
        sent = summary.sent,
        failed = summary.failed,
        invalid = summary.invalid,
        "Session finished"
    );
    Ok(ExitCode::SUCCESS)
}
