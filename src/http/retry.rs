//! Failure classification and backoff timing for AI service calls.

use std::time::Duration;

use super::transport::TransportError;
use crate::error::{ClientError, ErrorCode};

/// Delay before the first retry; each later retry doubles it.
const BASE_DELAY_MS: u64 = 1000;

/// Classifies a failed attempt into a [`ClientError`].
///
/// An HTTP status always wins over a transport error. `message` is the `error`
/// field of the response envelope, when there was one.
pub fn classify(
    status: Option<u16>,
    transport: Option<&TransportError>,
    message: Option<&str>,
) -> ClientError {
    let server_message = message.map(str::trim).filter(|m| !m.is_empty());
    let with_default = |code: ErrorCode, default: &str| {
        ClientError::new(code, server_message.unwrap_or(default))
    };

    if let Some(status) = status {
        return match status {
            401 => with_default(ErrorCode::Authentication, "Authentication required"),
            403 => with_default(ErrorCode::Authorization, "Access denied"),
            429 => with_default(ErrorCode::RateLimit, "Rate limit exceeded"),
            404 => with_default(ErrorCode::NotFound, "Resource not found"),
            500..=599 => with_default(ErrorCode::Service, "Service unavailable"),
            200..=299 => with_default(ErrorCode::Operation, "Operation failed"),
            // Remaining 4xx (and anything unexpected) will fail the same way again
            s => ClientError::new(
                ErrorCode::Operation,
                server_message
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Request failed with status {}", s)),
            ),
        };
    }

    match transport {
        Some(TransportError::Timeout) => ClientError::new(ErrorCode::Timeout, "Request timeout"),
        Some(TransportError::Connection(msg)) => ClientError::new(ErrorCode::Network, msg.clone()),
        None => with_default(ErrorCode::Operation, "Operation failed"),
    }
}

/// Exponential backoff between attempts of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(BASE_DELAY_MS),
        }
    }
}

impl Backoff {
    /// Delay to wait before making attempt `attempt` (1-based).
    ///
    /// The first attempt is never delayed; attempt `n >= 2` waits `base * 2^(n-2)`.
    pub fn delay_before_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        2u32.checked_pow(attempt - 2)
            .and_then(|factor| self.base.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }
}
