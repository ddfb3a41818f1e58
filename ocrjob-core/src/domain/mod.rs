//! Core domain types
//!
//! These types describe a unit of OCR work and its lifecycle as observed
//! through the job service. The client never mutates job state; it only
//! submits payloads and reads back what the service reports.

pub mod job;
pub mod payload;
