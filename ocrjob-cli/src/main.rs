//! OCR Job CLI
//!
//! Command-line interface for submitting OCR jobs to the remote worker
//! and collecting their results.

mod commands;
mod config;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ocrjob")]
#[command(about = "Submit OCR jobs and collect recognized LaTeX", long_about = None)]
struct Cli {
    /// API key for the job service
    #[arg(long, env = "RUNPOD_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Service endpoint (e.g., https://api.runpod.ai/v2/<endpoint-id>)
    #[arg(long, env = "RUNPOD_ENDPOINT")]
    endpoint: String,

    /// Seconds to wait for job completion
    #[arg(long, env = "JOB_TIMEOUT", default_value_t = 60)]
    timeout: u64,

    /// Seconds between status checks
    #[arg(long, env = "POLL_INTERVAL", default_value_t = 2)]
    poll_interval: u64,

    /// Seconds before a single HTTP request is abandoned
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 10)]
    request_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ocrjob=info,ocrjob_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config::new(
        cli.api_key,
        cli.endpoint,
        Duration::from_secs(cli.timeout),
        Duration::from_secs(cli.poll_interval),
        Duration::from_secs(cli.request_timeout),
    );

    handle_command(cli.command, &config).await
}
