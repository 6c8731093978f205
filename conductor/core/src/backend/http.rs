//! HTTP Backend Implementation
//!
//! Posts `{message, history}` as JSON to a single endpoint and parses
//! `{text?, emotion?}` out of the response. No retries. No timeout unless one
//! is configured, so a stalled server stalls the exchange.

use std::time::Duration;

use async_trait::async_trait;

use super::traits::{BackendError, ChatBackend, ChatReply, ChatRequest};

/// Default chat endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/chat";

/// HTTP chat backend
#[derive(Clone, Debug)]
pub struct HttpBackend {
    /// Full URL of the chat endpoint
    endpoint: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend without a request timeout
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built (e.g. TLS backend unavailable).
    pub fn new(endpoint: impl Into<String>) -> Result<Self, BackendError> {
        Self::with_timeout(endpoint, None)
    }

    /// Create a backend with an optional overall request timeout
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            endpoint: endpoint.into(),
            http_client: builder.build()?,
        })
    }

    /// The endpoint this backend posts to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "HTTP"
    }

    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            history = request.history.len(),
            "Sending chat request"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let reply: ChatReply = serde_json::from_str(&body)?;

        tracing::debug!(
            has_text = reply.text.is_some(),
            emotion = reply.emotion.as_deref().unwrap_or("-"),
            "Received chat reply"
        );

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::ChatMessage;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ChatRequest {
        ChatRequest::new("hello", vec![ChatMessage::user("hello")])
    }

    #[test]
    fn test_backend_creation() {
        let backend = HttpBackend::new(DEFAULT_ENDPOINT).unwrap();
        assert_eq!(backend.endpoint(), "http://localhost:8000/chat");
        assert_eq!(backend.name(), "HTTP");
    }

    #[tokio::test]
    async fn test_posts_json_and_parses_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "message": "hello",
                "history": [{"role": "user", "content": "hello"}]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"text": "こんにちは", "emotion": "smile"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let backend = HttpBackend::new(format!("{}/chat", server.uri())).unwrap();
        let reply = assert_ok!(backend.send(&request()).await);

        assert_eq!(reply, ChatReply::new("こんにちは", "smile"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(format!("{}/chat", server.uri())).unwrap();
        let err = assert_err!(backend.send(&request()).await);

        match err {
            BackendError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("Expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let backend = HttpBackend::new(format!("{}/chat", server.uri())).unwrap();
        let err = backend.send(&request()).await.unwrap_err();

        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        // Reserve a port, then free it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/chat", listener.local_addr().unwrap());
        drop(listener);

        let backend = HttpBackend::new(url).unwrap();
        let err = backend.send(&request()).await.unwrap_err();

        assert!(matches!(err, BackendError::Http(_)));
    }

    #[tokio::test]
    async fn test_timeout_applies_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"text": "late"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let backend = HttpBackend::with_timeout(
            format!("{}/chat", server.uri()),
            Some(Duration::from_millis(50)),
        )
        .unwrap();
        let err = backend.send(&request()).await.unwrap_err();

        assert!(matches!(err, BackendError::Http(ref e) if e.is_timeout()));
    }
}
