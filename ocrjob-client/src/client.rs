//! Job client
//!
//! Pairs a [`JobSubmitter`] and a [`JobPoller`] over one backend.

use std::sync::Arc;
use std::time::Duration;

use ocrjob_core::domain::job::{JobHandle, JobResult};
use serde_json::Value;

use crate::backend::{HttpJobBackend, JobBackend};
use crate::config::ClientConfig;
use crate::error::{JobError, Result};
use crate::poller::JobPoller;
use crate::submitter::JobSubmitter;

/// Submits OCR jobs and awaits their results
#[derive(Clone)]
pub struct JobClient {
    submitter: JobSubmitter,
    poller: JobPoller,
}

impl JobClient {
    /// Create a client over any backend
    pub fn new(backend: Arc<dyn JobBackend>, timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            submitter: JobSubmitter::new(Arc::clone(&backend)),
            poller: JobPoller::new(backend, timeout, poll_interval),
        }
    }

    /// Create a client talking HTTP to the configured service
    ///
    /// # Example
    /// ```no_run
    /// # use ocrjob_client::{ClientConfig, JobClient};
    /// # use serde_json::json;
    /// # async fn example() -> anyhow::Result<()> {
    /// let config = ClientConfig::new("api-key", "https://api.runpod.ai/v2/abc123");
    /// let client = JobClient::from_config(&config)?;
    /// let result = client.run(json!({ "image": "iVBORw0KGgo=" })).await?;
    /// println!("{}", result.recognized_text()?);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| JobError::Validation(e.to_string()))?;

        let backend = HttpJobBackend::from_config(config)
            .map_err(|e| JobError::Validation(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::new(
            Arc::new(backend),
            config.timeout,
            config.poll_interval,
        ))
    }

    pub fn submitter(&self) -> &JobSubmitter {
        &self.submitter
    }

    pub fn poller(&self) -> &JobPoller {
        &self.poller
    }

    /// Validate and submit a payload document
    pub async fn submit(&self, document: Value) -> Result<JobHandle> {
        self.submitter.submit(document).await
    }

    /// Await a submitted job with the configured budget
    pub async fn wait(&self, handle: &JobHandle) -> Result<JobResult> {
        self.poller.wait(handle).await
    }

    /// Submit a payload document and await its result
    pub async fn run(&self, document: Value) -> Result<JobResult> {
        let handle = self.submit(document).await?;
        self.wait(&handle).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_run_submits_then_polls() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .accept("job-1")
                .status_named("RUNNING")
                .status(json!({ "id": "job-1", "status": "COMPLETED", "output": { "latex": "eF4y" } })),
        );
        let client = JobClient::new(backend.clone(), Duration::from_secs(60), Duration::from_secs(2));

        let result = client.run(json!({ "image": "iVBORw0KGgo=" })).await.unwrap();

        assert_eq!(result.recognized_text().unwrap(), "x^2");
        assert_eq!(backend.submit_count(), 1);
        assert_eq!(backend.status_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_at_validation() {
        let backend = Arc::new(ScriptedBackend::new().accept("job-1").status_named("COMPLETED"));
        let client = JobClient::new(backend.clone(), Duration::from_secs(60), Duration::from_secs(2));

        let err = client.run(json!({ "input": {} })).await.unwrap_err();

        assert!(matches!(err, JobError::Validation(_)));
        assert_eq!(backend.submit_count(), 0);
        assert_eq!(backend.status_count(), 0);
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let config = ClientConfig::new("", "https://api.runpod.ai/v2/abc123");
        assert!(matches!(
            JobClient::from_config(&config),
            Err(JobError::Validation(_))
        ));
    }

    #[test]
    fn test_from_config_carries_budget() {
        let config = ClientConfig::new("key", "https://api.runpod.ai/v2/abc123")
            .with_timeout(Duration::from_secs(120))
            .with_poll_interval(Duration::from_secs(5));
        let client = JobClient::from_config(&config).unwrap();

        assert_eq!(client.poller().timeout(), Duration::from_secs(120));
        assert_eq!(client.poller().poll_interval(), Duration::from_secs(5));
    }
}
