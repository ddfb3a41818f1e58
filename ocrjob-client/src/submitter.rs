//! Job submitter
//!
//! Validates a payload document and hands it to the backend. Validation
//! happens before any request is made; transport failures are returned
//! as-is, without retry.

use std::sync::Arc;

use ocrjob_core::domain::job::JobHandle;
use ocrjob_core::domain::payload::Payload;
use serde_json::Value;
use tracing::{error, info};

use crate::backend::JobBackend;
use crate::error::{JobError, Result};

/// Submits payloads to the job service
#[derive(Clone)]
pub struct JobSubmitter {
    backend: Arc<dyn JobBackend>,
}

impl JobSubmitter {
    pub fn new(backend: Arc<dyn JobBackend>) -> Self {
        Self { backend }
    }

    /// Validate a JSON document and submit it
    ///
    /// # Errors
    /// * [`JobError::Validation`] if the document is not a valid payload
    /// * [`JobError::Submission`] on transport, auth or protocol failure
    pub async fn submit(&self, document: Value) -> Result<JobHandle> {
        let payload = Payload::from_value(document)?;
        self.submit_payload(&payload).await
    }

    /// Parse, validate and submit a JSON document given as text
    pub async fn submit_json(&self, text: &str) -> Result<JobHandle> {
        let payload = Payload::from_json(text)?;
        self.submit_payload(&payload).await
    }

    /// Submit an already validated payload
    pub async fn submit_payload(&self, payload: &Payload) -> Result<JobHandle> {
        info!("Submitting job");

        match self.backend.submit(payload).await {
            Ok(handle) => {
                info!("Job submitted: {}", handle);
                Ok(handle)
            }
            Err(e) => {
                error!("Failed to submit job: {}", e);
                Err(JobError::submission(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::testing::ScriptedBackend;
    use serde_json::json;

    const IMAGE: &str = "iVBORw0KGgo=";

    #[tokio::test]
    async fn test_submit_returns_handle() {
        let backend = Arc::new(ScriptedBackend::new().accept("job-1"));
        let submitter = JobSubmitter::new(backend.clone());

        let handle = submitter.submit(json!({ "image": IMAGE })).await.unwrap();

        assert_eq!(handle.as_str(), "job-1");
        assert_eq!(backend.submit_count(), 1);
        assert_eq!(backend.submitted.lock().unwrap()[0].image(), IMAGE);
    }

    #[tokio::test]
    async fn test_missing_image_never_reaches_backend() {
        let backend = Arc::new(ScriptedBackend::new().accept("job-1"));
        let submitter = JobSubmitter::new(backend.clone());

        let err = submitter
            .submit(json!({ "picture": IMAGE }))
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::Validation(_)));
        assert_eq!(backend.submit_count(), 0);
    }

    #[tokio::test]
    async fn test_unparsable_text_never_reaches_backend() {
        let backend = Arc::new(ScriptedBackend::new().accept("job-1"));
        let submitter = JobSubmitter::new(backend.clone());

        let err = submitter.submit_json("{ not json").await.unwrap_err();

        assert!(matches!(err, JobError::Validation(_)));
        assert_eq!(backend.submit_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_is_submission_error() {
        let backend = Arc::new(
            ScriptedBackend::new().reject(TransportError::api_error(401, "invalid api key")),
        );
        let submitter = JobSubmitter::new(backend.clone());

        let err = submitter.submit(json!({ "image": IMAGE })).await.unwrap_err();

        match err {
            JobError::Submission { source } => assert!(source.is_unauthorized()),
            other => panic!("expected submission error, got {other:?}"),
        }
        assert_eq!(backend.submit_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_handle_is_submission_error() {
        let backend = Arc::new(ScriptedBackend::new().reject(TransportError::Protocol(
            "submission accepted but no job id returned".into(),
        )));
        let submitter = JobSubmitter::new(backend);

        let err = submitter.submit(json!({ "image": IMAGE })).await.unwrap_err();

        assert!(matches!(
            err,
            JobError::Submission {
                source: TransportError::Protocol(_)
            }
        ));
    }
}
