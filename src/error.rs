//! Typed errors surfaced by the AI client.

use serde::{Serialize, Serializer, ser::SerializeStruct};
use std::fmt;

/// Failure kinds reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// HTTP 401
    Authentication,
    /// HTTP 403
    Authorization,
    /// HTTP 429
    RateLimit,
    /// HTTP 404
    NotFound,
    /// HTTP 5xx
    Service,
    /// The per-attempt timer fired or the transport reported a timeout
    Timeout,
    /// Connection-level failure without an HTTP status
    Network,
    /// The service answered but reported the operation as failed
    Operation,
}

impl ErrorCode {
    /// Wire name of the code, e.g. `RATE_LIMIT_ERROR`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Authentication => "AUTHENTICATION_ERROR",
            ErrorCode::Authorization => "AUTHORIZATION_ERROR",
            ErrorCode::RateLimit => "RATE_LIMIT_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Service => "SERVICE_ERROR",
            ErrorCode::Timeout => "TIMEOUT_ERROR",
            ErrorCode::Network => "NETWORK_ERROR",
            ErrorCode::Operation => "OPERATION_ERROR",
        }
    }

    /// Whether errors of this kind are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::Service | ErrorCode::Network)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Error returned by every client operation.
///
/// The message is meant for direct display; for classified 4xx responses it is
/// the text the service sent back.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientError {
    message: String,
    code: ErrorCode,
    retryable: bool,
}

impl ClientError {
    pub const NAME: &'static str = "AIClientError";

    /// Creates an error whose retryable flag follows its code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
            retryable: code.is_retryable(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ClientError {}

impl Serialize for ClientError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ClientError", 4)?;
        state.serialize_field("name", Self::NAME)?;
        state.serialize_field("message", &self.message)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("retryable", &self.retryable)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_follows_code() {
        assert!(ClientError::new(ErrorCode::Service, "x").is_retryable());
        assert!(ClientError::new(ErrorCode::Network, "x").is_retryable());
        assert!(!ClientError::new(ErrorCode::Timeout, "x").is_retryable());
        assert!(!ClientError::new(ErrorCode::RateLimit, "x").is_retryable());
        assert!(!ClientError::new(ErrorCode::Authentication, "x").is_retryable());
    }

    #[test]
    fn test_display_is_message() {
        let err = ClientError::new(ErrorCode::Authentication, "Authentication required");
        assert_eq!(err.to_string(), "Authentication required");
        assert_eq!(err.name(), "AIClientError");
    }

    #[test]
    fn test_serialize_json_shape() {
        let err = ClientError::new(ErrorCode::NotFound, "Template not found");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "AIClientError",
                "message": "Template not found",
                "code": "NOT_FOUND",
                "retryable": false
            })
        );
    }

    #[test]
    fn test_into_anyhow_keeps_type() {
        let err = anyhow::Error::from(ClientError::new(ErrorCode::Service, "down"));
        let inner = err.downcast_ref::<ClientError>().unwrap();
        assert_eq!(inner.code(), ErrorCode::Service);
    }
}
