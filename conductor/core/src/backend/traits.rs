//! Chat Backend Traits
//!
//! Trait definitions for the conversational backend. The Conductor talks to
//! whatever sits behind this trait: the HTTP gateway in production, a mock in
//! tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::messages::ChatMessage;

/// Request body sent to the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The message the user just typed
    pub message: String,
    /// Recent transcript, oldest first, including `message` as its last entry
    pub history: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Create a new request
    pub fn new(message: impl Into<String>, history: Vec<ChatMessage>) -> Self {
        Self {
            message: message.into(),
            history,
        }
    }
}

/// Reply body returned by the backend
///
/// Both fields are optional on the wire; the session supplies defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Reply text
    #[serde(default)]
    pub text: Option<String>,
    /// Emotion label driving the avatar expression
    #[serde(default)]
    pub emotion: Option<String>,
}

impl ChatReply {
    /// Create a reply with both fields set
    pub fn new(text: impl Into<String>, emotion: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            emotion: Some(emotion.into()),
        }
    }
}

/// Errors from a backend exchange
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection, DNS, TLS or timeout failure
    #[error("Backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (may be empty)
        body: String,
    },

    /// Response body was not the expected JSON
    #[error("Malformed backend response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Anything else (used by non-HTTP backends)
    #[error("{0}")]
    Other(String),
}

/// Chat backend trait
///
/// One request, one reply. Implementations must not retry.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Send one exchange and wait for the reply
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, BackendError>;
}
