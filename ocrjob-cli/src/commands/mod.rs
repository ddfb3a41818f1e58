//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit a payload file, wait for the result and save it
    Run {
        /// JSON payload file containing a base64 `image`
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the job output JSON
        #[arg(short, long, default_value = "output.json")]
        output: PathBuf,

        /// Also write an audit record of the submission and outcome
        #[arg(long)]
        audit: Option<PathBuf>,
    },
    /// Submit a payload file and print the job ID
    Submit {
        /// JSON payload file containing a base64 `image`
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Show the current status of a job
    Status {
        /// Job ID returned on submission
        id: String,
    },
    /// Wait for a submitted job to finish
    Wait {
        /// Job ID returned on submission
        id: String,

        /// Where to write the job output JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle a CLI command
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let client = config.job_client()?;

    match command {
        Commands::Run {
            input,
            output,
            audit,
        } => job::run_job(&client, &input, &output, audit.as_deref()).await,
        Commands::Submit { input } => job::submit_job(&client, &input).await,
        Commands::Status { id } => job::show_status(&client, &id).await,
        Commands::Wait { id, output } => job::wait_for_job(&client, &id, output.as_deref()).await,
    }
}
