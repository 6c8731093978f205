//! Conductor - The Orchestration Core
//!
//! The Conductor ties the chat session, the backend and the avatar together
//! and talks to a UI surface through two message types:
//! - `SurfaceEvent`: what the user did (received FROM the surface)
//! - `ConductorMessage`: what changed (sent TO the surface)
//!
//! The backend call of an exchange runs on a spawned task. Its outcome comes
//! back through a oneshot channel and is applied by [`Conductor::poll_exchange`]
//! or [`Conductor::wait_exchange`], so the surface's event loop never blocks
//! on the network.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::avatar::{AvatarStage, AvatarStatus};
use crate::backend::{BackendError, ChatBackend, ChatReply};
use crate::config::PastelConfig;
use crate::events::SurfaceEvent;
use crate::expression::{Expression, ExpressionMap};
use crate::messages::{ConductorMessage, MessageRole, SessionState};
use crate::session::{Session, SessionTexts};

type ExchangeOutcome = Result<ChatReply, BackendError>;

/// Conductor configuration
#[derive(Clone, Debug)]
pub struct ConductorConfig {
    /// Persona name shown on the bubble
    pub persona: String,
    /// Backend endpoint, for display only
    pub endpoint: String,
    /// Fixed session texts
    pub texts: SessionTexts,
    /// Expression identifiers for the avatar runtime
    pub expressions: ExpressionMap,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self::from(&PastelConfig::default())
    }
}

impl From<&PastelConfig> for ConductorConfig {
    fn from(config: &PastelConfig) -> Self {
        Self {
            persona: config.persona.clone(),
            endpoint: config.endpoint.clone(),
            texts: config.texts.clone(),
            expressions: config.expressions.clone(),
        }
    }
}

/// The Conductor - orchestrates one chat session
pub struct Conductor<B: ChatBackend> {
    /// Configuration
    config: ConductorConfig,
    /// Chat backend
    backend: Arc<B>,
    /// Conversation session
    session: Session,
    /// Avatar, if the surface has one
    avatar: Option<Arc<AvatarStage>>,
    /// Channel to send messages to the surface
    tx: mpsc::Sender<ConductorMessage>,
    /// Outcome of the in-flight exchange
    exchange_rx: Option<oneshot::Receiver<ExchangeOutcome>>,
    /// Task running the in-flight backend call
    exchange_task: Option<JoinHandle<()>>,
}

impl<B: ChatBackend + 'static> Conductor<B> {
    /// Create a new Conductor with the given backend
    pub fn new(backend: B, config: ConductorConfig, tx: mpsc::Sender<ConductorMessage>) -> Self {
        let session = Session::new(config.texts.clone());

        Self {
            config,
            backend: Arc::new(backend),
            session,
            avatar: None,
            tx,
            exchange_rx: None,
            exchange_task: None,
        }
    }

    /// Attach an avatar stage
    #[must_use]
    pub fn with_avatar(mut self, stage: Arc<AvatarStage>) -> Self {
        self.avatar = Some(stage);
        self
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// The conversation session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The avatar stage, if any
    pub fn avatar(&self) -> Option<&Arc<AvatarStage>> {
        self.avatar.as_ref()
    }

    /// Configuration
    pub fn config(&self) -> &ConductorConfig {
        &self.config
    }

    /// Start the Conductor
    ///
    /// Kicks off the avatar load in the background. The load result arrives
    /// later as `AvatarReady` or `AvatarUnavailable`.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        tracing::info!(
            backend = self.backend.name(),
            persona = %self.config.persona,
            "Starting conductor"
        );

        if let Some(stage) = self.avatar.clone() {
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let msg = match stage.initialize().await {
                    AvatarStatus::Ready { model } => ConductorMessage::AvatarReady { model },
                    AvatarStatus::Unavailable { reason } => {
                        ConductorMessage::AvatarUnavailable { reason }
                    }
                };
                if let Err(e) = tx.send(msg).await {
                    tracing::warn!("Failed to send avatar status to surface: {}", e);
                }
            });
        } else {
            self.send(ConductorMessage::AvatarUnavailable {
                reason: "avatar disabled".to_string(),
            })
            .await;
        }

        Ok(())
    }

    /// Handle an event from the UI surface
    pub async fn handle_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        match event {
            SurfaceEvent::Connected => {
                tracing::debug!("Surface connected");
                self.announce().await;
            }
            SurfaceEvent::UserMessage { content } => {
                self.submit(&content).await;
            }
            SurfaceEvent::QuitRequested => {
                self.shutdown().await?;
            }
        }
        Ok(())
    }

    /// Start an exchange for `content` if the session accepts it
    async fn submit(&mut self, content: &str) {
        let Some(request) = self.session.submit(content) else {
            return;
        };

        tracing::info!(
            history = request.history.len(),
            "Sending message to backend"
        );

        self.send(ConductorMessage::Message {
            role: MessageRole::User,
            content: request.message.clone(),
        })
        .await;
        self.send_state().await;

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let backend = Arc::clone(&self.backend);
        self.exchange_rx = Some(outcome_rx);
        self.exchange_task = Some(tokio::spawn(async move {
            let outcome = backend.send(&request).await;
            // Receiver gone means the conductor shut down
            let _ = outcome_tx.send(outcome);
        }));
    }

    /// Apply the exchange outcome if it has arrived
    ///
    /// Call this regularly from the surface loop. Returns true if an exchange
    /// finished.
    pub async fn poll_exchange(&mut self) -> bool {
        let Some(rx) = self.exchange_rx.as_mut() else {
            return false;
        };

        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::error::TryRecvError::Empty) => return false,
            Err(oneshot::error::TryRecvError::Closed) => Err(BackendError::Other(
                "exchange task ended without a reply".to_string(),
            )),
        };

        self.finish_exchange(outcome).await;
        true
    }

    /// Wait for the in-flight exchange and apply it
    ///
    /// Returns false if nothing was in flight.
    pub async fn wait_exchange(&mut self) -> bool {
        let Some(rx) = self.exchange_rx.as_mut() else {
            return false;
        };

        let outcome = match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(BackendError::Other(
                "exchange task ended without a reply".to_string(),
            )),
        };

        self.finish_exchange(outcome).await;
        true
    }

    async fn finish_exchange(&mut self, outcome: ExchangeOutcome) {
        self.exchange_rx = None;
        self.exchange_task = None;

        if let Some(expression) = self.session.complete(outcome) {
            if let Some(reply) = self.session.current_transcript().last() {
                self.send(ConductorMessage::Message {
                    role: reply.role,
                    content: reply.content.clone(),
                })
                .await;
            }
            self.apply_expression(expression).await;
        }

        self.send_state().await;
    }

    async fn apply_expression(&self, expression: Expression) {
        let expression_id = self.config.expressions.id(expression).to_string();

        if let Some(ref stage) = self.avatar {
            stage.set_expression(&expression_id);
        }

        tracing::debug!(
            expression = expression.face_name(),
            id = %expression_id,
            "Expression triggered"
        );

        self.send(ConductorMessage::Expression {
            expression,
            expression_id,
        })
        .await;
    }

    /// Shut down the Conductor
    ///
    /// An in-flight exchange is aborted and completed as a failure, so the
    /// session is idle again afterwards.
    pub async fn shutdown(&mut self) -> anyhow::Result<()> {
        if let Some(task) = self.exchange_task.take() {
            task.abort();
        }
        if self.exchange_rx.take().is_some() {
            self.session.complete(Err(BackendError::Other(
                "exchange aborted by shutdown".to_string(),
            )));
        }

        self.send(ConductorMessage::Quit).await;
        Ok(())
    }

    /// Session info, state and bubble, so a fresh surface can draw everything
    async fn announce(&self) {
        self.send(ConductorMessage::SessionInfo {
            persona: self.config.persona.clone(),
            endpoint: self.config.endpoint.clone(),
        })
        .await;
        self.send_state().await;
    }

    /// Send state and bubble text
    async fn send_state(&self) {
        self.send(ConductorMessage::State {
            state: self.session.state(),
        })
        .await;
        self.send(ConductorMessage::Bubble {
            text: self.session.bubble_text().to_string(),
        })
        .await;
    }

    /// Send a message to the UI surface
    async fn send(&self, msg: ConductorMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::backend::ChatRequest;
    use crate::messages::ChatMessage;
    use tokio::sync::Notify;

    /// Replies with a canned reply or fails; optionally waits for a go signal
    struct MockBackend {
        reply: Option<ChatReply>,
        calls: Arc<AtomicUsize>,
        gate: Option<Arc<Notify>>,
    }

    impl MockBackend {
        fn replying(text: &str, emotion: &str) -> Self {
            Self {
                reply: Some(ChatReply::new(text, emotion)),
                calls: Arc::new(AtomicUsize::new(0)),
                gate: None,
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                calls: Arc::new(AtomicUsize::new(0)),
                gate: None,
            }
        }
    }

    #[async_trait::async_trait]
    impl ChatBackend for MockBackend {
        fn name(&self) -> &str {
            "Mock"
        }

        async fn send(&self, _request: &ChatRequest) -> Result<ChatReply, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(ref gate) = self.gate {
                gate.notified().await;
            }
            self.reply
                .clone()
                .ok_or_else(|| BackendError::Other("connection refused".to_string()))
        }
    }

    fn drain(rx: &mut mpsc::Receiver<ConductorMessage>) -> Vec<ConductorMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[tokio::test]
    async fn test_conductor_creation() {
        let (tx, _rx) = mpsc::channel(100);
        let conductor = Conductor::new(
            MockBackend::replying("hi", "smile"),
            ConductorConfig::default(),
            tx,
        );

        assert_eq!(conductor.state(), SessionState::Idle);
        assert!(conductor.avatar().is_none());
        assert_eq!(conductor.config().persona, "丸山彩");
    }

    #[tokio::test]
    async fn test_start_and_connect_without_avatar() {
        let (tx, mut rx) = mpsc::channel(100);
        let mut conductor = Conductor::new(
            MockBackend::replying("hi", "smile"),
            ConductorConfig::default(),
            tx,
        );

        conductor.start().await.unwrap();
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [ConductorMessage::AvatarUnavailable { .. }]
        ));

        conductor
            .handle_event(SurfaceEvent::Connected)
            .await
            .unwrap();

        let msgs = drain(&mut rx);
        assert_eq!(
            msgs[0],
            ConductorMessage::SessionInfo {
                persona: "丸山彩".to_string(),
                endpoint: "http://localhost:8000/chat".to_string(),
            }
        );
        assert_eq!(
            msgs[1],
            ConductorMessage::State {
                state: SessionState::Idle
            }
        );
        assert_eq!(
            msgs[2],
            ConductorMessage::Bubble {
                text: SessionTexts::default().greeting
            }
        );
        assert_eq!(msgs.len(), 3);
    }

    #[tokio::test]
    async fn test_successful_exchange() {
        let (tx, mut rx) = mpsc::channel(100);
        let mut conductor = Conductor::new(
            MockBackend::replying("你好呀", "shy"),
            ConductorConfig::default(),
            tx,
        );

        conductor
            .handle_event(SurfaceEvent::user_message("hello"))
            .await
            .unwrap();
        assert_eq!(conductor.state(), SessionState::Pending);

        assert!(conductor.wait_exchange().await);
        assert_eq!(conductor.state(), SessionState::Idle);
        assert_eq!(
            conductor.session().current_transcript(),
            &[ChatMessage::user("hello"), ChatMessage::ai("你好呀")]
        );

        let msgs = drain(&mut rx);
        assert!(msgs.contains(&ConductorMessage::Bubble {
            text: SessionTexts::default().thinking
        }));
        assert!(msgs.contains(&ConductorMessage::Message {
            role: MessageRole::Ai,
            content: "你好呀".to_string()
        }));
        assert!(msgs.contains(&ConductorMessage::Expression {
            expression: Expression::Shy,
            expression_id: "f02".to_string()
        }));
        assert_eq!(
            msgs.last(),
            Some(&ConductorMessage::Bubble {
                text: "你好呀".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_failed_exchange() {
        let (tx, mut rx) = mpsc::channel(100);
        let mut conductor =
            Conductor::new(MockBackend::failing(), ConductorConfig::default(), tx);

        conductor
            .handle_event(SurfaceEvent::user_message("hello"))
            .await
            .unwrap();
        conductor.wait_exchange().await;

        assert_eq!(conductor.state(), SessionState::Idle);
        assert_eq!(conductor.session().current_transcript().len(), 1);

        let msgs = drain(&mut rx);
        assert!(!msgs
            .iter()
            .any(|m| matches!(m, ConductorMessage::Expression { .. })));
        assert_eq!(
            msgs.last(),
            Some(&ConductorMessage::Bubble {
                text: SessionTexts::default().connection_failure
            })
        );
    }

    #[tokio::test]
    async fn test_second_message_ignored_while_pending() {
        let gate = Arc::new(Notify::new());
        let backend = MockBackend {
            gate: Some(gate.clone()),
            ..MockBackend::replying("ok", "smile")
        };
        let calls = backend.calls.clone();
        let (tx, _rx) = mpsc::channel(100);
        let mut conductor = Conductor::new(backend, ConductorConfig::default(), tx);

        conductor
            .handle_event(SurfaceEvent::user_message("one"))
            .await
            .unwrap();
        conductor
            .handle_event(SurfaceEvent::user_message("two"))
            .await
            .unwrap();
        assert!(!conductor.poll_exchange().await);

        gate.notify_one();
        conductor.wait_exchange().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(conductor.session().count(MessageRole::User), 1);
    }

    #[tokio::test]
    async fn test_blank_message_ignored() {
        let backend = MockBackend::replying("ok", "smile");
        let calls = backend.calls.clone();
        let (tx, mut rx) = mpsc::channel(100);
        let mut conductor = Conductor::new(backend, ConductorConfig::default(), tx);

        conductor
            .handle_event(SurfaceEvent::user_message("   "))
            .await
            .unwrap();

        assert!(!conductor.wait_exchange().await);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_poll_without_exchange() {
        let (tx, _rx) = mpsc::channel(100);
        let mut conductor = Conductor::new(
            MockBackend::replying("ok", "smile"),
            ConductorConfig::default(),
            tx,
        );
        assert!(!conductor.poll_exchange().await);
    }

    #[tokio::test]
    async fn test_quit_sends_quit() {
        let (tx, mut rx) = mpsc::channel(100);
        let mut conductor = Conductor::new(
            MockBackend::replying("ok", "smile"),
            ConductorConfig::default(),
            tx,
        );

        conductor
            .handle_event(SurfaceEvent::QuitRequested)
            .await
            .unwrap();

        assert_eq!(drain(&mut rx), vec![ConductorMessage::Quit]);
    }

    #[tokio::test]
    async fn test_quit_while_pending_leaves_session_idle() {
        let gate = Arc::new(Notify::new());
        let backend = MockBackend {
            gate: Some(gate.clone()),
            ..MockBackend::replying("late", "smile")
        };
        let (tx, mut rx) = mpsc::channel(100);
        let mut conductor = Conductor::new(backend, ConductorConfig::default(), tx);

        conductor
            .handle_event(SurfaceEvent::user_message("one"))
            .await
            .unwrap();
        assert_eq!(conductor.state(), SessionState::Pending);

        conductor
            .handle_event(SurfaceEvent::QuitRequested)
            .await
            .unwrap();

        assert_eq!(conductor.state(), SessionState::Idle);
        assert_eq!(
            conductor.session().last_displayed_text(),
            SessionTexts::default().connection_failure
        );
        assert_eq!(conductor.session().count(MessageRole::Ai), 0);
        assert!(!conductor.poll_exchange().await);
        assert_eq!(drain(&mut rx).last(), Some(&ConductorMessage::Quit));

        // Session accepts input again
        conductor
            .handle_event(SurfaceEvent::user_message("two"))
            .await
            .unwrap();
        gate.notify_one();
        assert!(conductor.wait_exchange().await);
        assert_eq!(conductor.session().count(MessageRole::User), 2);
        assert_eq!(conductor.session().count(MessageRole::Ai), 1);
    }
}
