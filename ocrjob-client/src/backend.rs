//! Job backend
//!
//! The job service seen as a handle-keyed store with two operations:
//! accept a payload and report a job's status. [`HttpJobBackend`] speaks the
//! service's HTTP API; tests substitute an in-memory implementation.

use async_trait::async_trait;
use ocrjob_core::domain::job::JobHandle;
use ocrjob_core::domain::payload::Payload;
use ocrjob_core::dto::job::{RunRequest, RunResponse, StatusReport};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::TransportError;

/// Capability to submit jobs and query their status
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Submit a payload, returning the handle the service issued
    ///
    /// Exactly one request is made. A response without a usable id is a
    /// [`TransportError::Protocol`] error.
    async fn submit(&self, payload: &Payload) -> Result<JobHandle, TransportError>;

    /// Query the current status of a job
    async fn get_status(&self, handle: &JobHandle) -> Result<StatusReport, TransportError>;
}

/// HTTP implementation of [`JobBackend`]
///
/// - `POST {endpoint}/run` with body `{"input": <payload>}`
/// - `GET {endpoint}/status/{id}`
///
/// Both carry `Authorization: Bearer <credential>`.
#[derive(Clone)]
pub struct HttpJobBackend {
    /// Base URL of the service (no trailing slash)
    base_url: String,
    credential: String,
    client: Client,
}

impl HttpJobBackend {
    /// Create a backend with a default HTTP client
    ///
    /// # Arguments
    /// * `base_url` - The service endpoint (e.g., "https://api.runpod.ai/v2/abc123")
    /// * `credential` - Bearer token for all requests
    pub fn new(base_url: impl Into<String>, credential: impl Into<String>) -> Self {
        Self::with_client(base_url, credential, Client::new())
    }

    /// Create a backend with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        base_url: impl Into<String>,
        credential: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credential: credential.into(),
            client,
        }
    }

    /// Create a backend from client configuration
    ///
    /// Every request is bounded by `request_timeout`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self::with_client(
            config.service_endpoint.clone(),
            config.credential.clone(),
            client,
        ))
    }

    /// Get the base URL of the service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check the status code and deserialize a JSON body
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, TransportError> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[async_trait]
impl JobBackend for HttpJobBackend {
    async fn submit(&self, payload: &Payload) -> Result<JobHandle, TransportError> {
        let url = format!("{}/run", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.credential)
            .json(&RunRequest::new(payload))
            .send()
            .await?;

        let body: RunResponse = self.handle_response(response).await?;
        debug!("Submission accepted with status {:?}", body.status);

        body.id.and_then(JobHandle::new).ok_or_else(|| {
            TransportError::Protocol("submission accepted but no job id returned".to_string())
        })
    }

    async fn get_status(&self, handle: &JobHandle) -> Result<StatusReport, TransportError> {
        let url = format!("{}/status/{}", self.base_url, handle);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.credential)
            .send()
            .await?;

        let body: Value = self.handle_response(response).await?;

        StatusReport::from_body(body).map_err(|e| TransportError::Protocol(e.to_string()))
    }
}

impl std::fmt::Debug for HttpJobBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpJobBackend")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_creation() {
        let backend = HttpJobBackend::new("https://api.runpod.ai/v2/abc123", "key");
        assert_eq!(backend.base_url(), "https://api.runpod.ai/v2/abc123");
    }

    #[test]
    fn test_backend_trims_trailing_slash() {
        let backend = HttpJobBackend::new("https://api.runpod.ai/v2/abc123/", "key");
        assert_eq!(backend.base_url(), "https://api.runpod.ai/v2/abc123");
    }

    #[test]
    fn test_backend_from_config() {
        let config = ClientConfig::new("key", "http://localhost:8080/");
        let backend = HttpJobBackend::from_config(&config).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_debug_hides_credential() {
        let backend = HttpJobBackend::new("http://localhost:8080", "super-secret");
        assert!(!format!("{:?}", backend).contains("super-secret"));
    }
}
