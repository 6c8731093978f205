//! Pastel Conductor - Headless Chat Orchestration for Pastel Chat
//!
//! This crate holds everything about a Pastel Chat session that does not
//! depend on how it is drawn: the conversation state machine, the chat
//! backend client, emotion-to-expression mapping, the avatar lifecycle and
//! configuration loading.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Chat Surface (pastel-tui)               │
//! │             SurfaceEvent ▲ │ ConductorMessage            │
//! └──────────────────────────┼─┼─────────────────────────────┘
//!                            │ ▼
//! ┌──────────────────────────┴───────────────────────────────┐
//! │                        Conductor                         │
//! │  ┌──────────┐   ┌──────────────┐   ┌──────────────────┐  │
//! │  │ Session  │   │ ChatBackend  │   │   AvatarStage    │  │
//! │  │ (state)  │   │   (HTTP)     │   │ (AvatarRuntime)  │  │
//! │  └──────────┘   └──────────────┘   └──────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use pastel_conductor::{
//!     load_config, Conductor, ConductorConfig, HttpBackend, SurfaceEvent,
//! };
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let backend = HttpBackend::with_timeout(&config.endpoint, config.timeout)?;
//!
//!     let (tx, mut rx) = mpsc::channel(100);
//!     let mut conductor = Conductor::new(backend, ConductorConfig::from(&config), tx);
//!     conductor.start().await?;
//!
//!     conductor.handle_event(SurfaceEvent::user_message("你好")).await?;
//!     conductor.wait_exchange().await;
//!
//!     while let Ok(msg) = rx.try_recv() {
//!         println!("{msg:?}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`avatar`]: Avatar runtime seam, local-asset runtime, load-once stage
//! - [`backend`]: Chat backend trait and HTTP implementation
//! - [`conductor`]: Main Conductor struct
//! - [`config`]: TOML/env/CLI configuration
//! - [`events`]: Events from the surface to the Conductor
//! - [`expression`]: Emotion labels to avatar expressions
//! - [`messages`]: Transcript types and messages to the surface
//! - [`session`]: Conversation state machine
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod avatar;
pub mod backend;
pub mod conductor;
pub mod config;
pub mod events;
pub mod expression;
pub mod messages;
pub mod session;

// Re-exports for convenience
pub use avatar::{
    AvatarError, AvatarModel, AvatarRuntime, AvatarSnapshot, AvatarStage, AvatarStatus,
    EngineScript, LocalRuntime, ModelDescriptor, SurfaceSpec,
};
pub use backend::{
    BackendError, ChatBackend, ChatReply, ChatRequest, HttpBackend, DEFAULT_ENDPOINT,
};
pub use conductor::{Conductor, ConductorConfig};
pub use events::SurfaceEvent;
pub use expression::{Expression, ExpressionMap};
pub use messages::{ChatMessage, ConductorMessage, MessageRole, SessionState};
pub use session::{Session, SessionTexts, CONTEXT_WINDOW};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, load_config_unvalidated,
    load_config_unvalidated_with_env, load_config_with_env, ConfigError, ConfigOverrides,
    ConfigSource, PastelConfig, PastelToml,
};
