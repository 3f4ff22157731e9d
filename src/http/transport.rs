//! Single HTTP exchange with the AI backend.

use async_trait::async_trait;
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde_json::Value;
use std::fmt;

use crate::config::ClientConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// A request as issued by the executor; `endpoint` is relative to the backend base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Value>,
}

/// Raw response: status plus the undecoded body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure below the HTTP layer: no status code was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request was aborted because it ran out of time.
    Timeout,
    /// Connection refused, reset, DNS failure and the like.
    Connection(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Timeout => f.write_str("request timed out"),
            TransportError::Connection(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for TransportError {}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by a shared reqwest client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Builds a reqwest client carrying the configured bearer token.
    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = config.api_token() {
            let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            auth_value.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_value);
        }

        let client = Client::builder()
            .user_agent(concat!("folioai/", env!("FOLIOAI_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self::new(client, config.base_url()))
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, endpoint = %request.endpoint))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self.url_for(&request.endpoint);
        debug!("{} {}...", request.method, url);

        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send().await.map_err(from_reqwest)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(from_reqwest)?;

        Ok(HttpResponse { status, body })
    }
}

fn from_reqwest(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connection(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/api/ai/enhance-bio")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"bio": "hello"})))
            .with_status(200)
            .with_body(r#"{"success":true,"data":{}}"#)
            .create_async()
            .await;

        let transport = ReqwestTransport::new(Client::new(), server.url());
        let response = transport
            .send(HttpRequest {
                method: Method::Post,
                endpoint: "/api/ai/enhance-bio".to_string(),
                body: Some(json!({"bio": "hello"})),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 200);
        assert!(response.is_success());
        assert_eq!(response.body, r#"{"success":true,"data":{}}"#);
    }

    #[tokio::test]
    async fn test_error_status_is_not_transport_error() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/api/ai/history")
            .with_status(503)
            .create_async()
            .await;

        let transport = ReqwestTransport::new(Client::new(), server.url());
        let response = transport
            .send(HttpRequest {
                method: Method::Get,
                endpoint: "/api/ai/history".to_string(),
                body: None,
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 503);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_bearer_token_from_config() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/api/ai/templates")
            .match_header("authorization", "Bearer test-token")
            .match_header("user-agent", Matcher::Regex("^folioai/".to_string()))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let config = ClientConfig::new(server.url()).with_api_token("test-token");
        let transport = ReqwestTransport::from_config(&config).unwrap();
        transport
            .send(HttpRequest {
                method: Method::Get,
                endpoint: "api/ai/templates".to_string(),
                body: None,
            })
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[test]
    fn test_url_for_joins_slashes() {
        let transport = ReqwestTransport::new(Client::new(), "http://api.test/");
        assert_eq!(
            transport.url_for("/api/ai/enhance-bio"),
            "http://api.test/api/ai/enhance-bio"
        );
        assert_eq!(transport.url_for("api/ai/history"), "http://api.test/api/ai/history");
    }

    #[tokio::test]
    async fn test_base_url_with_trailing_slash() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/api/ai/history")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let transport = ReqwestTransport::new(Client::new(), format!("{}/", server.url()));
        transport
            .send(HttpRequest {
                method: Method::Get,
                endpoint: "/api/ai/history".to_string(),
                body: None,
            })
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_refused_is_connection_error() {
        // Port 1 on localhost is reserved and nothing listens there.
        let transport = ReqwestTransport::new(Client::new(), "http://127.0.0.1:1");
        let result = transport
            .send(HttpRequest {
                method: Method::Get,
                endpoint: "/".to_string(),
                body: None,
            })
            .await;

        assert!(matches!(result, Err(TransportError::Connection(_))));
    }
}
