//! Surface Events
//!
//! Events sent from the chat surface to the Conductor. The surface reports
//! what the user did; the Conductor decides what it means.

use serde::{Deserialize, Serialize};

/// Events from the chat surface to the Conductor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    /// Surface is up and wants the current state
    Connected,

    /// User pressed send
    UserMessage {
        /// Raw input text (not trimmed)
        content: String,
    },

    /// User asked to leave
    QuitRequested,
}

impl SurfaceEvent {
    /// Convenience constructor for a user message
    pub fn user_message(content: impl Into<String>) -> Self {
        Self::UserMessage {
            content: content.into(),
        }
    }
}
