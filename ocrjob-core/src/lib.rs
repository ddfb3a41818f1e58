//! OCR Job Core
//!
//! Core types shared by the OCR job client and CLI.
//!
//! This crate contains:
//! - Domain types: Payload, job handles, statuses and results
//! - DTOs: Request/response bodies exchanged with the job service

pub mod domain;
pub mod dto;
