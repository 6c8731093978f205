//! Session Management
//!
//! The conversation session owns the transcript, the in-flight flag and the
//! text shown in the speech bubble. It is a two-state machine:
//!
//! ```text
//!            submit (valid input)
//!   Idle ───────────────────────────▶ Pending
//!    ▲                                   │
//!    └─────── complete (Ok or Err) ──────┘
//! ```
//!
//! `submit` is the only way into `Pending`; `complete` is the only way out.
//! Anything else (empty input, a second submit while pending, a stray
//! completion while idle) is ignored without touching state.
//!
//! An exchange is split at its suspension point so the caller can run the
//! backend call wherever it likes (inline via [`Session::exchange`], or on a
//! spawned task as the Conductor does).

use serde::{Deserialize, Serialize};

use crate::backend::{BackendError, ChatBackend, ChatReply, ChatRequest};
use crate::expression::Expression;
use crate::messages::{ChatMessage, MessageRole, SessionState};

/// Number of transcript entries sent to the backend with each message
pub const CONTEXT_WINDOW: usize = 6;

/// Fixed texts the session shows in the speech bubble
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTexts {
    /// Bubble text before the first exchange
    pub greeting: String,
    /// AI content used when the reply has no text
    pub fallback_reply: String,
    /// Bubble text after a failed exchange
    pub connection_failure: String,
    /// Bubble text while an exchange is pending
    pub thinking: String,
}

impl Default for SessionTexts {
    fn default() -> Self {
        Self {
            greeting: "丸之山上缤纷彩！我是丸山彩！请多指教！( > < )".to_string(),
            fallback_reply: "呜呜...听不到你在说什么...".to_string(),
            connection_failure: "后端连接失败了... ( > < )".to_string(),
            thinking: "正在检索记忆...".to_string(),
        }
    }
}

/// A conversation session
#[derive(Clone, Debug)]
pub struct Session {
    /// Conversation history, oldest first
    transcript: Vec<ChatMessage>,
    /// Whether a backend exchange is in flight
    pending: bool,
    /// Text currently shown in the bubble (when not pending)
    last_displayed_text: String,
    /// Fixed display texts
    texts: SessionTexts,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionTexts::default())
    }
}

impl Session {
    /// Create an empty session
    pub fn new(texts: SessionTexts) -> Self {
        Self {
            transcript: Vec::new(),
            pending: false,
            last_displayed_text: texts.greeting.clone(),
            texts,
        }
    }

    /// Start an exchange
    ///
    /// Appends the user message, marks the session pending and returns the
    /// request to send. Returns `None` (and changes nothing) when the text is
    /// blank or an exchange is already pending.
    pub fn submit(&mut self, user_text: &str) -> Option<ChatRequest> {
        if user_text.trim().is_empty() {
            tracing::debug!("Ignoring blank message");
            return None;
        }
        if self.pending {
            tracing::debug!("Ignoring message while an exchange is pending");
            return None;
        }

        self.transcript.push(ChatMessage::user(user_text));
        self.pending = true;

        Some(ChatRequest::new(user_text, self.context_window().to_vec()))
    }

    /// Finish the pending exchange
    ///
    /// On success appends the AI reply and returns the expression to show.
    /// On failure only the bubble text changes. Either way the session goes
    /// back to idle. Returns `None` if nothing was pending.
    pub fn complete(&mut self, outcome: Result<ChatReply, BackendError>) -> Option<Expression> {
        if !self.pending {
            tracing::debug!("Ignoring completion with no exchange pending");
            return None;
        }
        self.pending = false;

        match outcome {
            Ok(reply) => {
                let text = reply
                    .text
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| self.texts.fallback_reply.clone());
                let expression = Expression::from_emotion(reply.emotion.as_deref());

                self.transcript.push(ChatMessage::ai(text.clone()));
                self.last_displayed_text = text;

                Some(expression)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chat exchange failed");
                self.last_displayed_text = self.texts.connection_failure.clone();
                None
            }
        }
    }

    /// Run a full exchange against a backend
    ///
    /// Returns `None` when the submission was ignored, otherwise the
    /// expression produced by the reply (`Some(None)` after a failure).
    pub async fn exchange<B>(&mut self, backend: &B, user_text: &str) -> Option<Option<Expression>>
    where
        B: ChatBackend + ?Sized,
    {
        let request = self.submit(user_text)?;
        let outcome = backend.send(&request).await;
        Some(self.complete(outcome))
    }

    /// Read-only snapshot of the transcript
    pub fn current_transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Whether a backend exchange is in flight
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        if self.pending {
            SessionState::Pending
        } else {
            SessionState::Idle
        }
    }

    /// Last text shown in the bubble
    pub fn last_displayed_text(&self) -> &str {
        &self.last_displayed_text
    }

    /// Text the bubble should show right now
    pub fn bubble_text(&self) -> &str {
        if self.pending {
            &self.texts.thinking
        } else {
            &self.last_displayed_text
        }
    }

    /// The tail of the transcript that goes out with the next request
    pub fn context_window(&self) -> &[ChatMessage] {
        let start = self.transcript.len().saturating_sub(CONTEXT_WINDOW);
        &self.transcript[start..]
    }

    /// Display texts
    pub fn texts(&self) -> &SessionTexts {
        &self.texts
    }

    /// Number of messages by role
    pub fn count(&self, role: MessageRole) -> usize {
        self.transcript.iter().filter(|m| m.role == role).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn failure() -> BackendError {
        BackendError::Other("connection refused".to_string())
    }

    #[test]
    fn test_session_creation() {
        let session = Session::default();
        assert!(session.current_transcript().is_empty());
        assert!(!session.is_pending());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.last_displayed_text(), SessionTexts::default().greeting);
    }

    #[test]
    fn test_submit_appends_and_goes_pending() {
        let mut session = Session::default();

        let request = session.submit("hello").unwrap();

        assert!(session.is_pending());
        assert_eq!(session.current_transcript(), &[ChatMessage::user("hello")]);
        assert_eq!(request.message, "hello");
        assert_eq!(request.history, vec![ChatMessage::user("hello")]);
    }

    #[test]
    fn test_submit_keeps_untrimmed_text() {
        let mut session = Session::default();
        let request = session.submit("  hi there ").unwrap();
        assert_eq!(request.message, "  hi there ");
        assert_eq!(session.current_transcript()[0].content, "  hi there ");
    }

    #[test]
    fn test_blank_submit_is_noop() {
        let mut session = Session::default();
        assert!(session.submit("").is_none());
        assert!(session.submit("   \n\t").is_none());
        assert!(session.current_transcript().is_empty());
        assert!(!session.is_pending());
    }

    #[test]
    fn test_submit_while_pending_is_noop() {
        let mut session = Session::default();
        session.submit("first").unwrap();

        assert!(session.submit("second").is_none());
        assert_eq!(session.current_transcript().len(), 1);
        assert!(session.is_pending());
    }

    #[test]
    fn test_successful_reply() {
        let mut session = Session::default();
        session.submit("hi").unwrap();

        let expression = session.complete(Ok(ChatReply::new("こんにちは", "smile")));

        assert_eq!(expression, Some(Expression::Smile));
        assert_eq!(expression.unwrap().face_name(), "happy-face");
        assert!(!session.is_pending());
        assert_eq!(
            session.current_transcript(),
            &[ChatMessage::user("hi"), ChatMessage::ai("こんにちは")]
        );
        assert_eq!(session.last_displayed_text(), "こんにちは");
    }

    #[test]
    fn test_missing_text_uses_fallback() {
        let mut session = Session::default();
        session.submit("hi").unwrap();

        session.complete(Ok(ChatReply {
            text: None,
            emotion: Some("cry".to_string()),
        }));

        let fallback = &SessionTexts::default().fallback_reply;
        assert_eq!(&session.current_transcript()[1].content, fallback);
        assert_eq!(session.last_displayed_text(), fallback);
    }

    #[test]
    fn test_empty_text_uses_fallback() {
        let mut session = Session::default();
        session.submit("hi").unwrap();
        session.complete(Ok(ChatReply::new("", "shy")));

        assert_eq!(
            session.current_transcript()[1].content,
            SessionTexts::default().fallback_reply
        );
    }

    #[test]
    fn test_unknown_emotion_is_neutral() {
        let mut session = Session::default();
        session.submit("hi").unwrap();
        let expression = session.complete(Ok(ChatReply::new("ok", "dance")));
        assert_eq!(expression, Some(Expression::Neutral));
    }

    #[test]
    fn test_failure_leaves_transcript_alone() {
        let mut session = Session::default();
        session.submit("hi").unwrap();

        let expression = session.complete(Err(failure()));

        assert_eq!(expression, None);
        assert!(!session.is_pending());
        assert_eq!(session.current_transcript().len(), 1);
        assert_eq!(
            session.last_displayed_text(),
            SessionTexts::default().connection_failure
        );
    }

    #[test]
    fn test_submit_accepted_after_completion() {
        let mut session = Session::default();

        session.submit("one").unwrap();
        session.complete(Err(failure()));
        assert!(session.submit("two").is_some());

        session.complete(Ok(ChatReply::new("reply", "smile")));
        assert!(session.submit("three").is_some());
        assert_eq!(session.count(MessageRole::User), 3);
        assert_eq!(session.count(MessageRole::Ai), 1);
    }

    #[test]
    fn test_stray_completion_ignored() {
        let mut session = Session::default();
        assert_eq!(session.complete(Ok(ChatReply::new("x", "smile"))), None);
        assert!(session.current_transcript().is_empty());
        assert_eq!(session.last_displayed_text(), SessionTexts::default().greeting);
    }

    #[test]
    fn test_context_window_is_transcript_tail() {
        let mut session = Session::default();
        for i in 0..5 {
            session.submit(&format!("q{i}")).unwrap();
            session.complete(Ok(ChatReply::new(format!("a{i}"), "smile")));
        }

        let request = session.submit("last").unwrap();
        let transcript = session.current_transcript();

        assert_eq!(transcript.len(), 11);
        assert_eq!(request.history.len(), CONTEXT_WINDOW);
        assert_eq!(request.history.as_slice(), &transcript[transcript.len() - 6..]);
        assert_eq!(request.history.last(), Some(&ChatMessage::user("last")));
    }

    #[test]
    fn test_bubble_text_follows_state() {
        let texts = SessionTexts::default();
        let mut session = Session::default();
        assert_eq!(session.bubble_text(), texts.greeting);

        session.submit("hi").unwrap();
        assert_eq!(session.bubble_text(), texts.thinking);

        session.complete(Ok(ChatReply::new("hey", "shy")));
        assert_eq!(session.bubble_text(), "hey");
    }

    #[test]
    fn test_custom_texts() {
        let texts = SessionTexts {
            greeting: "hello!".to_string(),
            fallback_reply: "...".to_string(),
            connection_failure: "offline".to_string(),
            thinking: "hmm".to_string(),
        };
        let mut session = Session::new(texts);
        assert_eq!(session.last_displayed_text(), "hello!");

        session.submit("hi").unwrap();
        session.complete(Err(failure()));
        assert_eq!(session.last_displayed_text(), "offline");
    }
}
