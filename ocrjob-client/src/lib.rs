//! OCR Job Client
//!
//! Submits OCR work to a remote job service and awaits the outcome.
//!
//! The service is reached only through a [`JobBackend`]: submit a payload,
//! get back an opaque [`JobHandle`], then poll its status until it completes,
//! fails, or the time budget runs out. Each outcome maps to a distinct
//! [`JobError`] kind so callers can decide whether to retry, give up, or wait
//! longer.
//!
//! # Example
//!
//! ```no_run
//! use ocrjob_client::{ClientConfig, JobClient};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::from_env()?;
//!     let client = JobClient::from_config(&config)?;
//!
//!     let handle = client.submit(json!({ "image": "iVBORw0KGgo=" })).await?;
//!     let result = client.wait(&handle).await?;
//!
//!     println!("Recognized: {}", result.recognized_text()?);
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod backend;
mod client;
pub mod config;
pub mod error;
mod poller;
mod submitter;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use audit::{AuditOutcome, AuditRecord};
pub use backend::{HttpJobBackend, JobBackend};
pub use client::JobClient;
pub use config::ClientConfig;
pub use error::{JobError, Result, TransportError};
pub use ocrjob_core::domain::job::{JobHandle, JobResult, JobStatus, ResultError};
pub use ocrjob_core::domain::payload::{Payload, PayloadError};
pub use ocrjob_core::dto::job::StatusReport;
pub use poller::JobPoller;
pub use submitter::JobSubmitter;
