//! Data Transfer Objects for the job service API
//!
//! Wire shapes for `POST /run` and `GET /status/{id}`.

pub mod job;
