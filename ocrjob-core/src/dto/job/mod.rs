//! Job DTOs for the job service API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::job::{JobResult, JobStatus, UnknownStatus};
use crate::domain::payload::Payload;

/// Body of `POST /run`
///
/// The service hands `input` to the worker unchanged. Envelope fields
/// carried by the payload sit beside it.
#[derive(Debug, Clone, Serialize)]
pub struct RunRequest<'a> {
    pub input: &'a Map<String, Value>,
    #[serde(flatten)]
    pub envelope: &'a Map<String, Value>,
}

impl<'a> RunRequest<'a> {
    pub fn new(payload: &'a Payload) -> Self {
        Self {
            input: payload.document(),
            envelope: payload.envelope(),
        }
    }
}

/// Response to `POST /run`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Why a status body could not be interpreted
#[derive(Debug, Error)]
pub enum StatusReportError {
    #[error("status response has no `status` field")]
    MissingStatus,

    #[error(transparent)]
    Unknown(#[from] UnknownStatus),
}

/// Response to `GET /status/{id}`
///
/// `body` keeps the full response so failure diagnostics reach the caller
/// exactly as the service sent them.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub status: JobStatus,
    pub output: Option<JobResult>,
    pub body: Value,
}

impl StatusReport {
    /// Interpret a raw status response body
    pub fn from_body(body: Value) -> Result<Self, StatusReportError> {
        let status = body
            .get("status")
            .and_then(Value::as_str)
            .ok_or(StatusReportError::MissingStatus)?
            .parse::<JobStatus>()?;

        let output = body
            .get("output")
            .filter(|output| !output.is_null())
            .cloned()
            .map(JobResult::new);

        Ok(Self {
            status,
            output,
            body,
        })
    }

    /// Result to hand back for a completed job
    ///
    /// A completed job without `output` yields an empty document rather
    /// than an error; decoding the text reports what is missing.
    pub fn result(&self) -> JobResult {
        self.output
            .clone()
            .unwrap_or_else(|| JobResult::new(Value::Object(Default::default())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_request_envelope() {
        let payload = Payload::from_value(json!({ "image": "aGk=" })).unwrap();
        let body = serde_json::to_value(RunRequest::new(&payload)).unwrap();
        assert_eq!(body, json!({ "input": { "image": "aGk=" } }));
    }

    #[test]
    fn test_run_request_sends_envelope_fields_beside_input() {
        let payload = Payload::from_value(json!({
            "input": { "image": "iVBORw0KGgo=" },
            "webhook": "https://example.com/hook"
        }))
        .unwrap();

        let body = serde_json::to_value(RunRequest::new(&payload)).unwrap();

        assert_eq!(
            body,
            json!({
                "input": { "image": "iVBORw0KGgo=" },
                "webhook": "https://example.com/hook"
            })
        );
    }

    #[test]
    fn test_status_report_completed() {
        let body = json!({
            "id": "job-1",
            "status": "COMPLETED",
            "output": { "latex": "eF4y" },
            "executionTime": 812
        });
        let report = StatusReport::from_body(body.clone()).unwrap();

        assert_eq!(report.status, JobStatus::Completed);
        assert_eq!(report.result().encoded_text(), Some("eF4y"));
        assert_eq!(report.body, body);
    }

    #[test]
    fn test_status_report_in_progress_has_no_output() {
        let report =
            StatusReport::from_body(json!({ "id": "job-1", "status": "IN_PROGRESS", "output": null }))
                .unwrap();
        assert_eq!(report.status, JobStatus::Running);
        assert!(report.output.is_none());
    }

    #[test]
    fn test_status_report_rejects_bad_status() {
        assert!(matches!(
            StatusReport::from_body(json!({ "id": "job-1" })),
            Err(StatusReportError::MissingStatus)
        ));
        assert!(matches!(
            StatusReport::from_body(json!({ "status": "PAUSED" })),
            Err(StatusReportError::Unknown(UnknownStatus(s))) if s == "PAUSED"
        ));
    }
}
