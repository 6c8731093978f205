//! Display State Types
//!
//! Types that represent what the TUI currently shows. They are derived only
//! from `ConductorMessage`s and used for rendering.
//!
//! # Design Philosophy
//!
//! The TUI is a "thin client": it renders what the Conductor tells it to.
//! Display state is the bridge between `ConductorMessage`s and rendering.

use pastel_conductor::{ConductorMessage, Expression, MessageRole, SessionState, SessionTexts};

/// A rendered conversation message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayMessage {
    /// Who sent this message
    pub role: MessageRole,
    /// The message content
    pub content: String,
}

impl DisplayMessage {
    /// Create a new display message
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// User messages sit on the right
    pub fn is_right_aligned(&self) -> bool {
        self.role == MessageRole::User
    }
}

/// Avatar panel state
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AvatarDisplay {
    /// Load still running
    Loading,
    /// Model on stage
    Ready {
        /// Model name
        model: String,
        /// Face to draw
        expression: Expression,
    },
    /// Load failed; chat continues without the avatar
    Unavailable {
        /// Why
        reason: String,
    },
}

/// Everything the TUI renders
#[derive(Clone, Debug)]
pub struct DisplayState {
    /// Conversation messages, oldest first
    pub messages: Vec<DisplayMessage>,
    /// Speech bubble text
    pub bubble: String,
    /// Session state
    pub state: SessionState,
    /// Persona name shown on the bubble
    pub persona: String,
    /// Backend endpoint, shown on the chat card's bottom border
    pub endpoint: String,
    /// Avatar panel
    pub avatar: AvatarDisplay,
    /// Set once the Conductor says goodbye
    pub quit: bool,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            bubble: SessionTexts::default().greeting,
            state: SessionState::Idle,
            persona: String::new(),
            endpoint: String::new(),
            avatar: AvatarDisplay::Loading,
            quit: false,
        }
    }
}

impl DisplayState {
    /// Create empty display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a message from the Conductor
    pub fn apply_message(&mut self, msg: ConductorMessage) {
        match msg {
            ConductorMessage::Message { role, content } => {
                self.messages.push(DisplayMessage::new(role, content));
            }
            ConductorMessage::Bubble { text } => {
                self.bubble = text;
            }
            ConductorMessage::State { state } => {
                self.state = state;
            }
            ConductorMessage::Expression { expression, .. } => {
                if let AvatarDisplay::Ready {
                    expression: ref mut current,
                    ..
                } = self.avatar
                {
                    *current = expression;
                }
            }
            ConductorMessage::AvatarReady { model } => {
                self.avatar = AvatarDisplay::Ready {
                    model,
                    expression: Expression::Neutral,
                };
            }
            ConductorMessage::AvatarUnavailable { reason } => {
                self.avatar = AvatarDisplay::Unavailable { reason };
            }
            ConductorMessage::SessionInfo { persona, endpoint } => {
                self.persona = persona;
                self.endpoint = endpoint;
            }
            ConductorMessage::Quit => {
                self.quit = true;
            }
        }
    }

    /// Whether a reply is being waited for
    pub fn is_pending(&self) -> bool {
        self.state == SessionState::Pending
    }

    /// Status label for the chat card header
    pub fn status_label(&self) -> &'static str {
        self.state.status_label()
    }
}
