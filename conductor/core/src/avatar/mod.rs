//! Avatar Lifecycle and Runtime Adapter
//!
//! This module contains:
//! - The runtime seam ([`runtime`]): traits for loading engines and models
//! - A local-asset runtime ([`local`]) that reads a model descriptor from disk
//! - [`AvatarStage`], the lifecycle object the composition root owns
//!
//! # Design Philosophy
//!
//! The avatar is decoration. Chat must keep working when the avatar is slow to
//! load, fails to load, or rejects a command. So:
//!
//! - Loading happens once per stage, no matter how many times or how
//!   concurrently `initialize` is called. A `OnceCell` is the guard.
//! - Every command first checks whether a model is loaded. Before that it is a
//!   no-op.
//! - Load and command errors are logged here and never returned.

pub mod local;
pub mod runtime;

pub use local::{
    DescriptorModel, LocalRuntime, ModelDescriptor, DEFAULT_ASSET_ROOT, DEFAULT_MODEL_PATH,
};
pub use runtime::{AvatarError, AvatarModel, AvatarRuntime, EngineScript, SurfaceSpec};

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

/// Outcome of the one-time load
enum LoadState {
    Loaded(Mutex<Box<dyn AvatarModel>>),
    Failed(String),
}

/// Result of [`AvatarStage::initialize`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvatarStatus {
    /// The model is on stage
    Ready {
        /// Model name
        model: String,
    },
    /// Loading failed; the avatar stays hidden
    Unavailable {
        /// Why loading failed
        reason: String,
    },
}

/// What the render path needs to draw the avatar
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarSnapshot {
    /// Model name
    pub model: String,
    /// Applied expression identifier
    pub expression: Option<String>,
    /// Playing motion group
    pub motion: Option<String>,
}

/// Owns the avatar model for the lifetime of the chat surface
pub struct AvatarStage {
    runtime: Arc<dyn AvatarRuntime>,
    surface: SurfaceSpec,
    model_url: String,
    state: OnceCell<LoadState>,
}

impl AvatarStage {
    /// Create a stage that will load `model_url` through `runtime`
    pub fn new(runtime: Arc<dyn AvatarRuntime>, model_url: impl Into<String>) -> Self {
        Self {
            runtime,
            surface: SurfaceSpec::default(),
            model_url: model_url.into(),
            state: OnceCell::new(),
        }
    }

    /// Use a different surface
    #[must_use]
    pub fn with_surface(mut self, surface: SurfaceSpec) -> Self {
        self.surface = surface;
        self
    }

    /// Load engines and model, exactly once
    ///
    /// Later and concurrent callers wait for the first load and get its result.
    pub async fn initialize(&self) -> AvatarStatus {
        let state = self.state.get_or_init(|| self.load()).await;
        match state {
            LoadState::Loaded(model) => AvatarStatus::Ready {
                model: model.lock().name().to_string(),
            },
            LoadState::Failed(reason) => AvatarStatus::Unavailable {
                reason: reason.clone(),
            },
        }
    }

    async fn load(&self) -> LoadState {
        tracing::info!(
            runtime = self.runtime.name(),
            model = %self.model_url,
            "Initializing avatar"
        );

        match self.try_load().await {
            Ok(model) => LoadState::Loaded(Mutex::new(model)),
            Err(e) => {
                tracing::error!(error = %e, "Avatar failed to load");
                LoadState::Failed(e.to_string())
            }
        }
    }

    async fn try_load(&self) -> Result<Box<dyn AvatarModel>, AvatarError> {
        tokio::try_join!(
            self.runtime.load_engine(EngineScript::Core),
            self.runtime.load_engine(EngineScript::Animation),
        )?;

        self.runtime.load_model(&self.surface, &self.model_url).await
    }

    fn model(&self) -> Option<&Mutex<Box<dyn AvatarModel>>> {
        match self.state.get() {
            Some(LoadState::Loaded(model)) => Some(model),
            _ => None,
        }
    }

    /// Whether a model is loaded
    pub fn is_loaded(&self) -> bool {
        self.model().is_some()
    }

    /// Whether the one-time load has finished (either way)
    pub fn is_settled(&self) -> bool {
        self.state.initialized()
    }

    /// Apply an expression. Returns whether it was applied.
    pub fn set_expression(&self, id: &str) -> bool {
        let Some(model) = self.model() else {
            tracing::debug!(expression = id, "Avatar not loaded, skipping expression");
            return false;
        };

        match model.lock().set_expression(id) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, expression = id, "Expression trigger failed");
                false
            }
        }
    }

    /// Start a motion. Returns whether it started.
    pub fn set_motion(&self, group: &str) -> bool {
        let Some(model) = self.model() else {
            tracing::debug!(motion = group, "Avatar not loaded, skipping motion");
            return false;
        };

        match model.lock().set_motion(group) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, motion = group, "Motion trigger failed");
                false
            }
        }
    }

    /// Current model state, if loaded
    pub fn snapshot(&self) -> Option<AvatarSnapshot> {
        let model = self.model()?.lock();
        Some(AvatarSnapshot {
            model: model.name().to_string(),
            expression: model.current_expression().map(String::from),
            motion: model.current_motion().map(String::from),
        })
    }
}

impl std::fmt::Debug for AvatarStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarStage")
            .field("runtime", &self.runtime.name())
            .field("model_url", &self.model_url)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
