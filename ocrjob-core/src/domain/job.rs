//! Job domain types

use std::fmt;
use std::str::FromStr;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Opaque job identifier issued by the service on submission
///
/// The handle is the only correlation key for status queries. It is never
/// empty: the service answering a submission without an id is a protocol
/// violation, not a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    /// Wrap a service-issued identifier, rejecting blank ones
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JobHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Job lifecycle status as reported by the service
///
/// Transitions are owned by the service and only ever move forward.
/// The service's native `IN_QUEUE` / `IN_PROGRESS` spellings are accepted
/// as aliases of `QUEUED` / `RUNNING`. Its `TIMED_OUT` is a job that the
/// service gave up on and is read as `FAILED`; the status body still says
/// `TIMED_OUT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    #[serde(alias = "IN_QUEUE")]
    Queued,
    #[serde(alias = "IN_PROGRESS")]
    Running,
    Completed,
    #[serde(alias = "TIMED_OUT")]
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Canonical wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::Running => "RUNNING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Cancelled => "CANCELLED",
        }
    }

    /// True once the service will no longer change this job's status
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Queued | JobStatus::Running)
    }

    /// True for the terminal states that carry a failure diagnostic
    pub fn is_failure(&self) -> bool {
        matches!(self, JobStatus::Failed | JobStatus::Cancelled)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string outside the known lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized job status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for JobStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QUEUED" | "IN_QUEUE" => Ok(JobStatus::Queued),
            "RUNNING" | "IN_PROGRESS" => Ok(JobStatus::Running),
            "COMPLETED" => Ok(JobStatus::Completed),
            "FAILED" | "TIMED_OUT" => Ok(JobStatus::Failed),
            "CANCELLED" => Ok(JobStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Errors extracting the recognized text from a job result
#[derive(Debug, Error)]
pub enum ResultError {
    /// The worker completed but reported its own error
    #[error("worker reported an error: {0}")]
    Worker(String),

    /// Neither recognized text nor a worker error is present
    #[error("job output has no `latex` field")]
    MissingText,

    /// The text field is not valid base64
    #[error("recognized text is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The decoded bytes are not UTF-8
    #[error("recognized text is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Output of a completed job
///
/// Wraps the service's `output` document verbatim. The worker places the
/// recognized LaTeX, base64-encoded, under `latex`; on internal errors it
/// completes with `{"error": "..."}` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobResult {
    output: Value,
}

impl JobResult {
    /// Field holding the base64-encoded recognized text
    pub const TEXT_FIELD: &'static str = "latex";

    /// Field a worker uses to report its own failure
    pub const ERROR_FIELD: &'static str = "error";

    pub fn new(output: Value) -> Self {
        Self { output }
    }

    /// Raw output document
    pub fn output(&self) -> &Value {
        &self.output
    }

    pub fn into_output(self) -> Value {
        self.output
    }

    /// Base64-encoded recognized text, if present
    pub fn encoded_text(&self) -> Option<&str> {
        self.output.get(Self::TEXT_FIELD).and_then(Value::as_str)
    }

    /// Error message reported by the worker, if any
    pub fn worker_error(&self) -> Option<&str> {
        self.output.get(Self::ERROR_FIELD).and_then(Value::as_str)
    }

    /// Decode the recognized text
    pub fn recognized_text(&self) -> Result<String, ResultError> {
        if let Some(encoded) = self.encoded_text() {
            let bytes = STANDARD.decode(encoded)?;
            return Ok(String::from_utf8(bytes)?);
        }

        match self.worker_error() {
            Some(message) => Err(ResultError::Worker(message.to_string())),
            None => Err(ResultError::MissingText),
        }
    }
}
