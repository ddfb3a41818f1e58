//! Configuration module
//!
//! Turns command-line options into client configuration.

use std::time::Duration;

use anyhow::{Context, Result};
use ocrjob_client::{ClientConfig, JobClient};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Settings handed to the job client
    pub client: ClientConfig,
}

impl Config {
    pub fn new(
        api_key: String,
        endpoint: String,
        timeout: Duration,
        poll_interval: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client: ClientConfig::new(api_key, endpoint)
                .with_timeout(timeout)
                .with_poll_interval(poll_interval)
                .with_request_timeout(request_timeout),
        }
    }

    /// Build a job client, validating the configuration first
    pub fn job_client(&self) -> Result<JobClient> {
        JobClient::from_config(&self.client).context("Invalid configuration")
    }
}
