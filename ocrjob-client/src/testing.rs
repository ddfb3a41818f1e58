//! Scripted in-memory backend for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ocrjob_core::domain::job::JobHandle;
use ocrjob_core::domain::payload::Payload;
use ocrjob_core::dto::job::StatusReport;
use serde_json::{Value, json};

use crate::backend::JobBackend;
use crate::error::TransportError;

type Scripted<T> = Result<T, TransportError>;

/// Replays queued responses; the last status response repeats forever
pub struct ScriptedBackend {
    submissions: Mutex<VecDeque<Scripted<JobHandle>>>,
    statuses: Mutex<VecDeque<Scripted<Value>>>,
    last_status: Mutex<Option<Value>>,
    latency: Duration,
    pub submit_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub submitted: Mutex<Vec<Payload>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            submissions: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(VecDeque::new()),
            last_status: Mutex::new(None),
            latency: Duration::ZERO,
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Delay every status answer by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn accept(self, id: &str) -> Self {
        self.submissions
            .lock()
            .unwrap()
            .push_back(Ok(JobHandle::new(id).unwrap()));
        self
    }

    pub fn reject(self, err: TransportError) -> Self {
        self.submissions.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn status(self, body: Value) -> Self {
        self.statuses.lock().unwrap().push_back(Ok(body));
        self
    }

    pub fn status_named(self, status: &str) -> Self {
        self.status(json!({ "id": "job-1", "status": status }))
    }

    pub fn status_error(self, err: TransportError) -> Self {
        self.statuses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn submit_count(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn status_count(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobBackend for ScriptedBackend {
    async fn submit(&self, payload: &Payload) -> Result<JobHandle, TransportError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(payload.clone());
        self.submissions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Protocol("no scripted submission".into())))
    }

    async fn get_status(&self, _handle: &JobHandle) -> Result<StatusReport, TransportError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let next = self.statuses.lock().unwrap().pop_front();
        let body = match next {
            Some(Ok(body)) => {
                *self.last_status.lock().unwrap() = Some(body.clone());
                body
            }
            Some(Err(err)) => return Err(err),
            None => self
                .last_status
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| TransportError::Protocol("no scripted status".into()))?,
        };

        StatusReport::from_body(body).map_err(|e| TransportError::Protocol(e.to_string()))
    }
}
