//! Resilient client for the portfolio AI service.
//!
//! Operations go through [`operations::AiClient`], which retries transient
//! failures with exponential backoff, times out every attempt, and reports
//! failures as a typed [`error::ClientError`]. [`batch`] runs several
//! operations at once without letting one failure affect the others.

pub mod batch;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod operations;

pub use config::ClientConfig;
pub use error::{ClientError, ErrorCode};
pub use operations::AiClient;
