//! Error types for the OCR job client

use std::time::Duration;

use ocrjob_core::domain::job::{JobHandle, JobStatus};
use ocrjob_core::domain::payload::PayloadError;
use serde_json::Value;
use thiserror::Error;

/// Result type alias for job operations
pub type Result<T> = std::result::Result<T, JobError>;

/// Failures talking to the job service
///
/// Returned by [`JobBackend`](crate::JobBackend) implementations and carried
/// as the source of [`JobError::Submission`] and [`JobError::Poll`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned a non-2xx status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Response body was not the expected JSON
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Response parsed but broke the service contract
    #[error("Protocol violation: {0}")]
    Protocol(String),
}

impl TransportError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if the service rejected the credential
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::ApiError { status: 401 | 403, .. })
    }

    /// Check if the response broke the service contract
    ///
    /// Asking again will get the same answer.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::Protocol(_) | Self::ParseError(_))
    }

    /// Check if sending the same request again may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) => true,
            Self::ApiError { status, .. } => !matches!(status, 400..=499) || *status == 429,
            Self::ParseError(_) | Self::Protocol(_) => false,
        }
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}

/// Errors surfaced by submission and polling
///
/// Each kind calls for different handling: transport failures may be
/// retried, job failures should not be, timeouts may warrant a larger budget.
#[derive(Debug, Error)]
pub enum JobError {
    /// Payload or call arguments rejected locally, nothing was sent
    #[error("invalid request: {0}")]
    Validation(String),

    /// Submitting the job failed
    #[error("job submission failed: {source}")]
    Submission {
        #[source]
        source: TransportError,
    },

    /// A status query failed
    #[error("status query for job {handle} failed: {source}")]
    Poll {
        handle: JobHandle,
        #[source]
        source: TransportError,
    },

    /// The service reported FAILED or CANCELLED
    #[error("job {handle} ended {status}: {diagnostic}")]
    JobFailed {
        handle: JobHandle,
        status: JobStatus,
        /// Status body exactly as the service returned it
        diagnostic: Value,
    },

    /// The job was still pending when the budget ran out
    #[error("job {handle} did not finish within {elapsed:?}")]
    Timeout { handle: JobHandle, elapsed: Duration },
}

impl JobError {
    pub(crate) fn submission(source: TransportError) -> Self {
        Self::Submission { source }
    }

    pub(crate) fn poll(handle: &JobHandle, source: TransportError) -> Self {
        Self::Poll {
            handle: handle.clone(),
            source,
        }
    }

    /// Transport failures, where trying again may succeed
    ///
    /// Rejected credentials, other 4xx answers and responses that break the
    /// service contract are not retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Submission { source } | Self::Poll { source, .. } => source.is_transient(),
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn is_job_failure(&self) -> bool {
        matches!(self, Self::JobFailed { .. })
    }

    /// Handle of the job this error concerns, when one was issued
    pub fn handle(&self) -> Option<&JobHandle> {
        match self {
            Self::Poll { handle, .. }
            | Self::JobFailed { handle, .. }
            | Self::Timeout { handle, .. } => Some(handle),
            Self::Validation(_) | Self::Submission { .. } => None,
        }
    }
}

impl From<PayloadError> for JobError {
    fn from(err: PayloadError) -> Self {
        Self::Validation(err.to_string())
    }
}
