//! Request executor: timed attempts with classified, bounded retries.

use log::{debug, warn};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::retry::{Backoff, classify};
use super::transport::{HttpRequest, HttpResponse, Method, Transport, TransportError};
use crate::config::ClientConfig;
use crate::error::{ClientError, ErrorCode};

const INVALID_RESPONSE: &str = "Invalid response from AI service";

/// Body shape of every backend response, whatever the status.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperationEnvelope {
    #[serde(default)]
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
}

/// Result of a single attempt, decided once by the executor.
#[derive(Debug)]
enum Outcome<R> {
    Success(R),
    Retry(ClientError),
    Terminal(ClientError),
}

/// Runs requests against the backend with a per-attempt timeout and a
/// shared retry budget.
pub struct RequestExecutor<T> {
    transport: T,
    config: ClientConfig,
    backoff: Backoff,
}

impl<T: Transport> RequestExecutor<T> {
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            backoff: Backoff::default(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Issues `method endpoint` and decodes the envelope's `data` into `R`.
    ///
    /// Retryable failures are retried with exponential backoff until
    /// `max_retries` attempts have been made; everything else ends the call.
    #[tracing::instrument(skip(self, payload))]
    pub async fn execute<R: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<Value>,
    ) -> Result<R, ClientError> {
        let request = HttpRequest {
            method,
            endpoint: endpoint.to_string(),
            body: payload,
        };
        let max_attempts = self.config.max_retries();
        let mut attempt = 1;

        loop {
            match self.attempt(&request, attempt).await {
                Outcome::Success(data) => return Ok(data),
                Outcome::Terminal(e) => {
                    debug!(
                        "{} {}: giving up after attempt {}/{}: {} ({})",
                        method,
                        endpoint,
                        attempt,
                        max_attempts,
                        e,
                        e.code()
                    );
                    return Err(e);
                }
                Outcome::Retry(e) => {
                    let delay = self.backoff.delay_before_attempt(attempt + 1);
                    warn!(
                        "{} {}: attempt {}/{} failed ({}), retrying in {}ms...",
                        method,
                        endpoint,
                        attempt,
                        max_attempts,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt<R: DeserializeOwned>(&self, request: &HttpRequest, attempt: u32) -> Outcome<R> {
        let sent = tokio::time::timeout(self.config.timeout(), self.transport.send(request.clone()))
            .await
            .unwrap_or(Err(TransportError::Timeout));

        let error = match sent {
            Ok(response) => match decode_response(&response) {
                Ok(data) => return Outcome::Success(data),
                Err(e) => e,
            },
            Err(transport_error) => classify(None, Some(&transport_error), None),
        };

        if error.is_retryable() && attempt < self.config.max_retries() {
            Outcome::Retry(error)
        } else {
            Outcome::Terminal(error)
        }
    }
}

/// Turns a raw response into the operation's data or a classified error.
fn decode_response<R: DeserializeOwned>(response: &HttpResponse) -> Result<R, ClientError> {
    let envelope: Option<OperationEnvelope> = if response.body.trim().is_empty() {
        None
    } else {
        serde_json::from_str(&response.body).ok()
    };

    if !response.is_success() {
        let message = envelope.and_then(|e| e.error);
        return Err(classify(Some(response.status), None, message.as_deref()));
    }

    match envelope {
        Some(envelope) if envelope.success => {
            serde_json::from_value(envelope.data.unwrap_or(Value::Null)).map_err(|e| {
                debug!("Failed to decode response data: {}", e);
                ClientError::new(ErrorCode::Operation, INVALID_RESPONSE)
            })
        }
        Some(envelope) => Err(classify(
            Some(response.status),
            None,
            envelope.error.as_deref(),
        )),
        None => Err(ClientError::new(ErrorCode::Operation, INVALID_RESPONSE)),
    }
}
