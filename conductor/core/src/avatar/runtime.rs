//! Avatar Runtime Traits
//!
//! The avatar runtime is an external capability: it loads engine code, puts a
//! model on a drawing surface and accepts expression/motion commands. These
//! traits are the seam between the Conductor and whatever actually draws.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Engine scripts the runtime needs before a model can load
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineScript {
    /// Core model engine
    Core,
    /// Model-animation engine
    Animation,
}

impl EngineScript {
    /// Both engines, in load order (they are loaded in parallel anyway)
    pub const ALL: [EngineScript; 2] = [Self::Core, Self::Animation];

    /// Location relative to the asset root
    #[must_use]
    pub fn relative_path(&self) -> &'static str {
        match self {
            Self::Core => "live2d/live2dcubismcore.min.js",
            Self::Animation => "live2d/live2d.min.js",
        }
    }
}

impl fmt::Display for EngineScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core => write!(f, "core engine"),
            Self::Animation => write!(f, "animation engine"),
        }
    }
}

/// Where and how big the model is drawn
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSpec {
    /// Surface width in pixels
    pub width: u32,
    /// Surface height in pixels
    pub height: u32,
    /// Whether the surface background is transparent
    pub transparent: bool,
    /// Model scale factor
    pub scale: f32,
    /// Model x offset
    pub x: i32,
    /// Model y offset
    pub y: i32,
    /// Whether the model reacts to pointer input on its own
    pub auto_interact: bool,
}

impl Default for SurfaceSpec {
    fn default() -> Self {
        Self {
            width: 500,
            height: 700,
            transparent: true,
            scale: 0.25,
            x: 0,
            y: 50,
            auto_interact: false,
        }
    }
}

/// Errors from the avatar runtime
#[derive(Debug, Error)]
pub enum AvatarError {
    /// An engine script is missing or empty
    #[error("{engine} not found at {path}")]
    EngineMissing {
        /// Which engine
        engine: EngineScript,
        /// Where it was looked for
        path: PathBuf,
    },

    /// Reading an asset failed
    #[error("Failed to read {path}: {source}")]
    Io {
        /// The asset path
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// The model descriptor is not valid JSON of the expected shape
    #[error("Invalid model descriptor {path}: {source}")]
    Descriptor {
        /// The descriptor path
        path: PathBuf,
        /// The parse error
        source: serde_json::Error,
    },

    /// The model has no expression with this identifier
    #[error("Unknown expression: {0}")]
    UnknownExpression(String),

    /// The model has no motion group with this name
    #[error("Unknown motion group: {0}")]
    UnknownMotion(String),

    /// Runtime-specific failure
    #[error("Avatar runtime error: {0}")]
    Runtime(String),
}

/// A loaded avatar model
pub trait AvatarModel: Send {
    /// Model name
    fn name(&self) -> &str;

    /// Switch to an expression by runtime identifier
    ///
    /// # Errors
    ///
    /// Fails if the model does not know the expression.
    fn set_expression(&mut self, id: &str) -> Result<(), AvatarError>;

    /// Start a motion from a motion group
    ///
    /// # Errors
    ///
    /// Fails if the model does not know the group.
    fn set_motion(&mut self, group: &str) -> Result<(), AvatarError>;

    /// Currently applied expression identifier
    fn current_expression(&self) -> Option<&str>;

    /// Currently playing motion group
    fn current_motion(&self) -> Option<&str>;
}

/// Avatar runtime trait
///
/// Implement this to plug in a different renderer.
#[async_trait]
pub trait AvatarRuntime: Send + Sync {
    /// Runtime name for logging
    fn name(&self) -> &str;

    /// Load one engine script
    async fn load_engine(&self, engine: EngineScript) -> Result<(), AvatarError>;

    /// Create a surface and load the model descriptor at `model_url` onto it
    async fn load_model(
        &self,
        surface: &SurfaceSpec,
        model_url: &str,
    ) -> Result<Box<dyn AvatarModel>, AvatarError>;
}
