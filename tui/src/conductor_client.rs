//! Conductor Client
//!
//! Thin wrapper around the Conductor for TUI integration. The Conductor is
//! embedded directly (no IPC). This is also the composition root: it builds
//! the HTTP backend and the avatar stage from configuration.
//!
//! The TUI's job is:
//! 1. Convert terminal events to `SurfaceEvent`s
//! 2. Send them to the Conductor
//! 3. Receive `ConductorMessage`s
//! 4. Render display state based on those messages

use std::sync::Arc;

use tokio::sync::mpsc;

use pastel_conductor::{
    AvatarStage, ChatBackend, Conductor, ConductorConfig, ConductorMessage, HttpBackend,
    LocalRuntime, PastelConfig, SessionState, SurfaceEvent,
};

/// Channel capacity for Conductor -> TUI messages
const CHANNEL_CAPACITY: usize = 100;

/// Client for communicating with the embedded Conductor
pub struct ConductorClient<B: ChatBackend = HttpBackend> {
    /// The embedded Conductor instance
    conductor: Conductor<B>,
    /// Receiver for messages from Conductor
    rx: mpsc::Receiver<ConductorMessage>,
}

impl ConductorClient<HttpBackend> {
    /// Build the HTTP backend and avatar stage from configuration
    pub fn from_config(config: &PastelConfig) -> anyhow::Result<Self> {
        let backend = HttpBackend::with_timeout(&config.endpoint, config.timeout)?;
        let stage = config.avatar_enabled.then(|| {
            Arc::new(AvatarStage::new(
                Arc::new(LocalRuntime::new(&config.asset_root)),
                config.model_path.clone(),
            ))
        });

        tracing::info!(
            endpoint = %config.endpoint,
            avatar = config.avatar_enabled,
            asset_root = %config.asset_root.display(),
            "Creating conductor"
        );

        Ok(Self::with_backend(backend, ConductorConfig::from(config), stage))
    }
}

impl<B: ChatBackend + 'static> ConductorClient<B> {
    /// Wrap a Conductor around any backend
    pub fn with_backend(
        backend: B,
        config: ConductorConfig,
        avatar: Option<Arc<AvatarStage>>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let mut conductor = Conductor::new(backend, config, tx);
        if let Some(stage) = avatar {
            conductor = conductor.with_avatar(stage);
        }

        Self { conductor, rx }
    }

    /// Start the Conductor (kicks off the avatar load)
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.conductor.start().await
    }

    /// Connect this surface to the Conductor
    pub async fn connect(&mut self) -> anyhow::Result<()> {
        self.conductor.handle_event(SurfaceEvent::Connected).await
    }

    /// Send a user message to the Conductor
    pub async fn send_message(&mut self, content: String) -> anyhow::Result<()> {
        self.conductor
            .handle_event(SurfaceEvent::UserMessage { content })
            .await
    }

    /// Notify Conductor that user wants to quit
    pub async fn request_quit(&mut self) -> anyhow::Result<()> {
        self.conductor
            .handle_event(SurfaceEvent::QuitRequested)
            .await
    }

    /// Apply a finished exchange, if any (must be called regularly)
    pub async fn poll_exchange(&mut self) -> bool {
        self.conductor.poll_exchange().await
    }

    /// Receive all pending messages from the Conductor (non-blocking)
    pub fn recv_all(&mut self) -> Vec<ConductorMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Get the current session state
    pub fn state(&self) -> SessionState {
        self.conductor.state()
    }
}
