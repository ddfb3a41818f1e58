//! Client configuration
//!
//! Credential, service endpoint and the polling budget. Configuration is
//! passed explicitly into constructors; nothing here is process-global.

use std::fmt;
use std::time::Duration;

use anyhow::Context;

/// Client configuration
#[derive(Clone)]
pub struct ClientConfig {
    /// Bearer token sent with every request
    pub credential: String,

    /// Base URL for submission and status calls (e.g., "https://api.runpod.ai/v2/<endpoint-id>")
    pub service_endpoint: String,

    /// Total wall-clock budget for awaiting a job
    pub timeout: Duration,

    /// Delay between status queries
    pub poll_interval: Duration,

    /// Upper bound on a single HTTP request
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Creates a new configuration with defaults
    pub fn new(credential: impl Into<String>, service_endpoint: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            service_endpoint: service_endpoint.into(),
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - RUNPOD_API_KEY (required)
    /// - RUNPOD_ENDPOINT (required)
    /// - JOB_TIMEOUT (optional, seconds, default: 60)
    /// - POLL_INTERVAL (optional, seconds, default: 2)
    /// - REQUEST_TIMEOUT (optional, seconds, default: 10)
    ///
    /// An optional variable that is set but not a whole number of seconds is
    /// an error rather than a silent fallback to the default.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let credential = lookup("RUNPOD_API_KEY")
            .ok_or_else(|| anyhow::anyhow!("RUNPOD_API_KEY environment variable not set"))?;

        let service_endpoint = lookup("RUNPOD_ENDPOINT")
            .ok_or_else(|| anyhow::anyhow!("RUNPOD_ENDPOINT environment variable not set"))?;

        let mut config = Self::new(credential, service_endpoint);

        if let Some(timeout) = secs(&lookup, "JOB_TIMEOUT")? {
            config.timeout = timeout;
        }
        if let Some(poll_interval) = secs(&lookup, "POLL_INTERVAL")? {
            config.poll_interval = poll_interval;
        }
        if let Some(request_timeout) = secs(&lookup, "REQUEST_TIMEOUT")? {
            config.request_timeout = request_timeout;
        }

        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.credential.trim().is_empty() {
            anyhow::bail!("credential cannot be empty");
        }

        if self.service_endpoint.is_empty() {
            anyhow::bail!("service_endpoint cannot be empty");
        }

        if !self.service_endpoint.starts_with("http://")
            && !self.service_endpoint.starts_with("https://")
        {
            anyhow::bail!("service_endpoint must start with http:// or https://");
        }

        if self.timeout.is_zero() {
            anyhow::bail!("timeout must be greater than 0");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.poll_interval >= self.timeout {
            anyhow::bail!("poll_interval must be shorter than timeout");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

// Keeps the credential out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("credential", &"<redacted>")
            .field("service_endpoint", &self.service_endpoint)
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn secs(lookup: impl Fn(&str) -> Option<String>, name: &str) -> anyhow::Result<Option<Duration>> {
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let secs = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{name} must be a whole number of seconds, got {raw:?}"))?;
    Ok(Some(Duration::from_secs(secs)))
}
