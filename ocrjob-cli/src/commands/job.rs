//! Job command handlers
//!
//! Submitting payload files, checking status, and waiting for results.
//! Waiting stops on Ctrl-C; the job itself keeps running on the service.

use std::path::Path;

use anyhow::{Context, Result};
use colored::*;
use ocrjob_client::{
    AuditRecord, JobClient, JobError, JobHandle, JobResult, JobStatus, Payload, ResultError,
};
use tracing::{info, warn};

/// Submit, wait, save the output, and log the recognized LaTeX
pub async fn run_job(
    client: &JobClient,
    input: &Path,
    output: &Path,
    audit: Option<&Path>,
) -> Result<()> {
    let payload = read_payload(input).await?;
    let mut record = AuditRecord::new(&payload);

    let handle = match client.submitter().submit_payload(&payload).await {
        Ok(handle) => handle,
        Err(e) => {
            print_failure(&e);
            if let Some(path) = audit {
                record.finish(&Err(e));
                record.write_to(path).await?;
                anyhow::bail!("Job submission failed; see {}", path.display());
            }
            return Err(e.into());
        }
    };
    println!("{} Submitted job {}", "✓".green(), handle.to_string().cyan());
    record = record.with_handle(handle.clone());

    let outcome = await_or_interrupt(client, &handle).await;

    if let Some(path) = audit {
        if let Some(outcome) = &outcome {
            record.finish(outcome);
        }
        record.write_to(path).await?;
        info!("Audit record saved to {}", path.display());
    }

    let result = finish(&handle, outcome)?;
    write_output(output, &result).await?;
    info!("Output saved to {}: {}", output.display(), result.output());
    print_recognized_text(&result);

    Ok(())
}

/// Submit a payload file and print its job ID
pub async fn submit_job(client: &JobClient, input: &Path) -> Result<()> {
    let payload = read_payload(input).await?;
    let handle = client
        .submitter()
        .submit_payload(&payload)
        .await
        .inspect_err(print_failure)?;

    println!("{} Submitted job {}", "✓".green(), handle.to_string().cyan());
    println!(
        "  {}",
        format!("Wait for it with: ocrjob wait {}", handle).dimmed()
    );

    Ok(())
}

/// Query and print a job's status once
pub async fn show_status(client: &JobClient, id: &str) -> Result<()> {
    let handle = parse_handle(id)?;
    let report = client.poller().check(&handle).await?;

    println!("{}", "Job Status:".bold());
    println!("  ID:     {}", handle.to_string().cyan());
    println!("  Status: {}", colorize_status(report.status));

    if let Ok(pretty) = serde_json::to_string_pretty(&report.body) {
        println!("\n{}", "Response:".bold());
        println!("{}", pretty);
    }

    Ok(())
}

/// Wait for an already submitted job
pub async fn wait_for_job(client: &JobClient, id: &str, output: Option<&Path>) -> Result<()> {
    let handle = parse_handle(id)?;
    let result = finish(&handle, await_or_interrupt(client, &handle).await)?;

    match output {
        Some(path) => {
            write_output(path, &result).await?;
            info!("Output saved to {}", path.display());
        }
        None => {
            println!("{}", "Output:".bold());
            println!("{}", serde_json::to_string_pretty(result.output())?);
        }
    }
    print_recognized_text(&result);

    Ok(())
}

/// Wait for completion unless interrupted
///
/// Returns `None` on Ctrl-C.
async fn await_or_interrupt(
    client: &JobClient,
    handle: &JobHandle,
) -> Option<ocrjob_client::Result<JobResult>> {
    tokio::select! {
        outcome = client.wait(handle) => Some(outcome),
        _ = tokio::signal::ctrl_c() => {
            warn!("Stopped waiting for job {}; it keeps running on the service", handle);
            None
        }
    }
}

/// Turn a wait outcome into a result, printing guidance on failure
fn finish(handle: &JobHandle, outcome: Option<ocrjob_client::Result<JobResult>>) -> Result<JobResult> {
    let Some(outcome) = outcome else {
        anyhow::bail!("Interrupted while waiting for job {}", handle);
    };

    outcome.map_err(|e| {
        print_failure(&e);
        anyhow::Error::from(e)
    })
}

async fn read_payload(path: &Path) -> Result<Payload> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read payload file {}", path.display()))?;

    let payload = Payload::from_json(&text)
        .map_err(JobError::from)
        .with_context(|| format!("Invalid payload in {}", path.display()))?;

    Ok(payload)
}

async fn write_output(path: &Path, result: &JobResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result.output())?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write output to {}", path.display()))
}

fn parse_handle(id: &str) -> Result<JobHandle> {
    JobHandle::new(id).ok_or_else(|| anyhow::anyhow!("Job ID cannot be empty"))
}

fn print_recognized_text(result: &JobResult) {
    match result.recognized_text() {
        Ok(latex) => {
            info!("Recognized LaTeX: {}", latex);
            println!("\n{}", "Recognized LaTeX:".bold());
            println!("{}", latex.green());
        }
        Err(ResultError::Worker(message)) => {
            warn!("Worker reported an error: {}", message);
            println!("\n{} {}", "Worker error:".red().bold(), message);
        }
        Err(e) => warn!("Could not decode recognized text: {}", e),
    }
}

/// Print what went wrong and what the caller can do about it
fn print_failure(err: &JobError) {
    match err {
        JobError::JobFailed {
            status, diagnostic, ..
        } => {
            println!("{} Job ended {}", "✗".red(), colorize_status(*status));
            if let Ok(pretty) = serde_json::to_string_pretty(diagnostic) {
                println!("{}", pretty.dimmed());
            }
        }
        _ => println!("{} {}", "✗".red(), err),
    }
    if let Some(hint) = failure_hint(err) {
        println!("  {}", hint.dimmed());
    }
}

/// What the caller can do about a failure, if anything
fn failure_hint(err: &JobError) -> Option<String> {
    match err {
        JobError::Timeout { handle, .. } => Some(format!(
            "Increase --timeout or resume with: ocrjob wait {}",
            handle
        )),
        JobError::Submission { source } | JobError::Poll { source, .. }
            if source.is_unauthorized() =>
        {
            Some("The service rejected the API key; check --api-key / RUNPOD_API_KEY.".to_string())
        }
        _ if err.is_retryable() => Some("Transient failure; retrying may succeed.".to_string()),
        _ => None,
    }
}

/// Colorize job status for display
fn colorize_status(status: JobStatus) -> colored::ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Queued => status_str.yellow(),
        JobStatus::Running => status_str.cyan(),
        JobStatus::Completed => status_str.green(),
        JobStatus::Failed => status_str.red(),
        JobStatus::Cancelled => status_str.dimmed(),
    }
}
