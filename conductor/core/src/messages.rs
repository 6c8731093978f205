//! Conductor Messages
//!
//! Messages sent from the Conductor to the chat surface, plus the transcript
//! entry type shared by the session and the backend wire format.
//!
//! # Design Philosophy
//!
//! The surface is a pure renderer. Everything it shows (transcript entries,
//! the speech bubble, the status label, the avatar face) arrives here as a
//! `ConductorMessage`. The surface never reads session state directly.

use serde::{Deserialize, Serialize};

use crate::expression::Expression;

/// Who authored a transcript entry
///
/// Serialized exactly as the backend expects: `"user"` or `"ai"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Typed by the person at the keyboard
    User,
    /// Returned by the chat backend
    Ai,
}

/// One entry in the chat transcript
///
/// Immutable once appended to a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who sent this message
    pub role: MessageRole,
    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an AI message
    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Ai,
            content: content.into(),
        }
    }
}

/// Externally visible session state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Ready for the next message
    #[default]
    Idle,
    /// A backend exchange is in flight
    Pending,
}

impl SessionState {
    /// Status label shown in the chat title bar
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Idle => "Online",
            Self::Pending => "Connecting...",
        }
    }
}

/// Messages from Conductor to the chat surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConductorMessage {
    /// A transcript entry was appended
    Message {
        /// Who sent this message
        role: MessageRole,
        /// The message content
        content: String,
    },

    /// Speech bubble text changed
    Bubble {
        /// Text to show next to the avatar
        text: String,
    },

    /// Session moved between idle and pending
    State {
        /// The new state
        state: SessionState,
    },

    /// Avatar expression was triggered
    Expression {
        /// Semantic expression
        expression: Expression,
        /// Identifier sent to the avatar runtime
        expression_id: String,
    },

    /// Avatar model finished loading
    AvatarReady {
        /// Model name from the descriptor
        model: String,
    },

    /// Avatar could not be loaded; chat keeps working without it
    AvatarUnavailable {
        /// Human-readable reason
        reason: String,
    },

    /// Session information, sent once a surface connects
    SessionInfo {
        /// Persona name shown on the bubble
        persona: String,
        /// Backend endpoint in use
        endpoint: String,
    },

    /// Conductor is shutting down
    Quit,
}
