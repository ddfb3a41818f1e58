//! Audit records
//!
//! Optional caller-side record of what was submitted and what came back,
//! written as pretty JSON for debugging. Not needed for correctness.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ocrjob_core::domain::job::{JobHandle, JobResult, JobStatus};
use ocrjob_core::domain::payload::Payload;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::JobError;

/// How a job ended, as far as the client saw it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditOutcome {
    Pending,
    Completed { output: Value },
    Failed { status: JobStatus, diagnostic: Value },
    TimedOut { elapsed_secs: f64 },
    Error { message: String },
}

/// One submission and its outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub handle: Option<JobHandle>,
    pub payload: Value,
    pub submitted_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcome: AuditOutcome,
}

impl AuditRecord {
    pub fn new(payload: &Payload) -> Self {
        Self {
            handle: None,
            payload: payload.to_value(),
            submitted_at: Utc::now(),
            finished_at: None,
            outcome: AuditOutcome::Pending,
        }
    }

    pub fn with_handle(mut self, handle: JobHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Record the final outcome of awaiting the job
    pub fn finish(&mut self, outcome: &Result<JobResult, JobError>) {
        self.finished_at = Some(Utc::now());
        self.outcome = match outcome {
            Ok(result) => AuditOutcome::Completed {
                output: result.output().clone(),
            },
            Err(JobError::JobFailed {
                status, diagnostic, ..
            }) => AuditOutcome::Failed {
                status: *status,
                diagnostic: diagnostic.clone(),
            },
            Err(JobError::Timeout { elapsed, .. }) => AuditOutcome::TimedOut {
                elapsed_secs: elapsed.as_secs_f64(),
            },
            Err(e) => AuditOutcome::Error {
                message: e.to_string(),
            },
        };
    }

    /// Write the record as pretty JSON
    pub async fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize audit record")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write audit record to {}", path.display()))
    }

    pub async fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read audit record from {}", path.display()))?;
        serde_json::from_str(&json).context("Failed to parse audit record")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn record() -> AuditRecord {
        let payload = Payload::from_value(json!({ "image": "iVBORw0KGgo=" })).unwrap();
        AuditRecord::new(&payload).with_handle(JobHandle::new("job-1").unwrap())
    }

    #[test]
    fn test_finish_classifies_outcomes() {
        let mut audit = record();
        assert_eq!(audit.outcome, AuditOutcome::Pending);

        audit.finish(&Ok(JobResult::new(json!({ "latex": "eF4y" }))));
        assert_eq!(
            audit.outcome,
            AuditOutcome::Completed {
                output: json!({ "latex": "eF4y" })
            }
        );
        assert!(audit.finished_at.is_some());

        audit.finish(&Err(JobError::JobFailed {
            handle: JobHandle::new("job-1").unwrap(),
            status: JobStatus::Cancelled,
            diagnostic: json!({ "status": "CANCELLED" }),
        }));
        assert!(matches!(
            audit.outcome,
            AuditOutcome::Failed {
                status: JobStatus::Cancelled,
                ..
            }
        ));

        audit.finish(&Err(JobError::Timeout {
            handle: JobHandle::new("job-1").unwrap(),
            elapsed: Duration::from_secs(60),
        }));
        assert_eq!(audit.outcome, AuditOutcome::TimedOut { elapsed_secs: 60.0 });
    }

    #[tokio::test]
    async fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.json");

        let mut audit = record();
        audit.finish(&Ok(JobResult::new(json!({ "latex": "eF4y" }))));
        audit.write_to(&path).await.unwrap();

        let loaded = AuditRecord::read_from(&path).await.unwrap();
        assert_eq!(loaded, audit);
        assert_eq!(loaded.payload, json!({ "image": "iVBORw0KGgo=" }));
    }
}
