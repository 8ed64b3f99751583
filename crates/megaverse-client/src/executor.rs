//! HTTP transport abstraction

use async_trait::async_trait;
use megaverse_core::{MegaverseError, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

/// HTTP methods the Megaverse API uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Status and raw body of a completed HTTP exchange
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

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// Trait for sending a single HTTP request (allows mocking in tests)
///
/// Any status code is an `Ok` response; only transport failures are `Err`.
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse>;
}

#[async_trait]
impl<E: HttpExecutor + ?Sized> HttpExecutor for Arc<E> {
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse> {
        (**self).send(method, url, body).await
    }
}

/// Real executor backed by reqwest
#[derive(Debug, Clone, Default)]
pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl ReqwestExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    #[instrument(skip(self, body))]
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse> {
        let mut request = self.client.request(method.into(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MegaverseError::Other(format!("Failed to send request: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| MegaverseError::Other(format!("Failed to read response: {}", e)))?;

        debug!("{} {} -> {}", method, url, status);

        Ok(HttpResponse { status, body })
    }
}

/// A request captured by [`MockExecutor`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
enum MockReply {
    Response(HttpResponse),
    TransportError,
}

/// Mock executor replaying a scripted sequence of replies
#[derive(Debug, Default)]
pub struct MockExecutor {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and body
    pub fn with_response(self, status: u16, body: &str) -> Self {
        self.push(MockReply::Response(HttpResponse::new(status, body)));
        self
    }

    /// Queue `count` consecutive 429 responses
    pub fn with_rate_limits(self, count: usize) -> Self {
        for _ in 0..count {
            self.push(MockReply::Response(HttpResponse::new(429, "Too Many Requests")));
        }
        self
    }

    /// Queue a connection-level failure
    pub fn with_transport_error(self) -> Self {
        self.push(MockReply::TransportError);
        self
    }

    /// Every request sent so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn push(&self, reply: MockReply) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }
}

#[async_trait]
impl HttpExecutor for MockExecutor {
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedRequest {
                method,
                url: url.to_string(),
                body: body.cloned(),
            });

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match reply {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::TransportError) => {
                Err(MegaverseError::Other("Mock transport error".to_string()))
            }
            None => Err(MegaverseError::Other(format!(
                "No mock response for: {} {}",
                method, url
            ))),
        }
    }
}
