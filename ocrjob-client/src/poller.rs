//! Job poller
//!
//! Queries a job's status until the service reports a terminal state or the
//! wall-clock budget runs out. The only suspension point between queries is
//! the sleep; dropping the returned future stops polling without touching the
//! remote job.

use std::sync::Arc;
use std::time::Duration;

use ocrjob_core::domain::job::{JobHandle, JobResult, JobStatus};
use ocrjob_core::dto::job::StatusReport;
use tokio::time::{self, Instant};
use tracing::{debug, error, info};

use crate::backend::JobBackend;
use crate::error::{JobError, Result};

/// Awaits job completion by polling the backend
#[derive(Clone)]
pub struct JobPoller {
    backend: Arc<dyn JobBackend>,
    timeout: Duration,
    poll_interval: Duration,
}

impl JobPoller {
    /// Creates a poller with a default budget used by [`JobPoller::wait`]
    pub fn new(backend: Arc<dyn JobBackend>, timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            backend,
            timeout,
            poll_interval,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Await completion with the poller's configured budget
    pub async fn wait(&self, handle: &JobHandle) -> Result<JobResult> {
        self.await_completion(handle, self.timeout, self.poll_interval)
            .await
    }

    /// Query a job's status once
    ///
    /// Terminal statuses are not turned into errors here.
    pub async fn check(&self, handle: &JobHandle) -> Result<StatusReport> {
        self.backend.get_status(handle).await.map_err(|e| {
            error!("Failed to poll job status for {}: {}", handle, e);
            JobError::poll(handle, e)
        })
    }

    /// Poll until the job reaches a terminal state or `timeout` elapses
    ///
    /// The deadline is checked before every query. Sleeps are clamped to the
    /// remaining budget, and a query still in flight at the deadline is
    /// abandoned, so a timeout is reported less than one `poll_interval` past
    /// the deadline however slow the service answers.
    ///
    /// # Errors
    /// * [`JobError::Validation`] if `timeout` or `poll_interval` is zero
    /// * [`JobError::Poll`] on the first failed status query
    /// * [`JobError::JobFailed`] if the service reports FAILED, TIMED_OUT or
    ///   CANCELLED
    /// * [`JobError::Timeout`] if the job is still pending at the deadline
    pub async fn await_completion(
        &self,
        handle: &JobHandle,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<JobResult> {
        if timeout.is_zero() {
            return Err(JobError::Validation(
                "timeout must be greater than 0".to_string(),
            ));
        }
        if poll_interval.is_zero() {
            return Err(JobError::Validation(
                "poll_interval must be greater than 0".to_string(),
            ));
        }

        let started = Instant::now();
        let deadline = started + timeout;
        let mut attempts: u32 = 0;

        loop {
            if started.elapsed() >= timeout {
                return Err(self.timed_out(handle, started, attempts));
            }

            attempts += 1;
            let report = match time::timeout_at(deadline, self.check(handle)).await {
                Ok(report) => report?,
                Err(_) => {
                    debug!("Status query for job {} still pending at the deadline", handle);
                    return Err(self.timed_out(handle, started, attempts));
                }
            };

            match report.status {
                JobStatus::Completed => {
                    info!("Job {} completed", handle);
                    return Ok(report.result());
                }
                JobStatus::Failed | JobStatus::Cancelled => {
                    error!("Job {} failed: {}", handle, report.body);
                    return Err(JobError::JobFailed {
                        handle: handle.clone(),
                        status: report.status,
                        diagnostic: report.body,
                    });
                }
                JobStatus::Queued | JobStatus::Running => {
                    debug!("Job {} status: {}, waiting...", handle, report.status);
                    let remaining = timeout.saturating_sub(started.elapsed());
                    time::sleep(poll_interval.min(remaining)).await;
                }
            }
        }
    }

    fn timed_out(&self, handle: &JobHandle, started: Instant, attempts: u32) -> JobError {
        let elapsed = started.elapsed();
        error!(
            "Job {} timed out after {:?} ({} status checks)",
            handle, elapsed, attempts
        );
        JobError::Timeout {
            handle: handle.clone(),
            elapsed,
        }
    }
}
