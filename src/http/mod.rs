//! HTTP plumbing for the AI client: transport, classification, backoff and the retry loop.

mod client;
mod retry;
mod transport;

pub use client::{OperationEnvelope, RequestExecutor};
pub use retry::classify;
#[cfg(test)]
pub use transport::MockTransport;
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError};
