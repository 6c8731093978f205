//! Local Asset Runtime
//!
//! Resolves engine scripts and the model descriptor from a directory on disk
//! (the same layout a web front-end serves from its public folder):
//!
//! ```text
//! <asset_root>/
//!   live2d/live2dcubismcore.min.js
//!   live2d/live2d.min.js
//!   models/aya/model.json
//! ```
//!
//! The descriptor is a Cubism 2 `model.json`. Only the parts needed to
//! validate commands are read: the model name, its expressions and its motion
//! groups.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::runtime::{AvatarError, AvatarModel, AvatarRuntime, EngineScript, SurfaceSpec};

/// Default model descriptor location, relative to the asset root
pub const DEFAULT_MODEL_PATH: &str = "models/aya/model.json";

/// Default asset root
pub const DEFAULT_ASSET_ROOT: &str = "public";

/// One expression entry in a model descriptor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionEntry {
    /// Expression identifier (e.g. `f01`)
    pub name: String,
    /// Expression file, relative to the descriptor
    pub file: String,
}

/// One motion entry in a model descriptor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionEntry {
    /// Motion file, relative to the descriptor
    pub file: String,
}

/// Cubism 2 model descriptor (`model.json`)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Model name
    #[serde(default)]
    pub name: Option<String>,
    /// Model data file
    #[serde(default)]
    pub model: Option<String>,
    /// Texture files
    #[serde(default)]
    pub textures: Vec<String>,
    /// Available expressions
    #[serde(default)]
    pub expressions: Vec<ExpressionEntry>,
    /// Motion groups
    #[serde(default)]
    pub motions: BTreeMap<String, Vec<MotionEntry>>,
}

impl ModelDescriptor {
    /// Whether the descriptor lists this expression
    #[must_use]
    pub fn has_expression(&self, id: &str) -> bool {
        self.expressions.iter().any(|e| e.name == id)
    }

    /// Whether the descriptor has a non-empty motion group with this name
    #[must_use]
    pub fn has_motion(&self, group: &str) -> bool {
        self.motions.get(group).is_some_and(|m| !m.is_empty())
    }
}

/// A model loaded from a descriptor
#[derive(Clone, Debug)]
pub struct DescriptorModel {
    name: String,
    descriptor: ModelDescriptor,
    surface: SurfaceSpec,
    expression: Option<String>,
    motion: Option<String>,
}

impl DescriptorModel {
    /// Wrap a parsed descriptor
    pub fn new(name: impl Into<String>, descriptor: ModelDescriptor, surface: SurfaceSpec) -> Self {
        Self {
            name: name.into(),
            descriptor,
            surface,
            expression: None,
            motion: None,
        }
    }

    /// The parsed descriptor
    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    /// Surface the model was placed on
    pub fn surface(&self) -> &SurfaceSpec {
        &self.surface
    }
}

impl AvatarModel for DescriptorModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_expression(&mut self, id: &str) -> Result<(), AvatarError> {
        if !self.descriptor.has_expression(id) {
            return Err(AvatarError::UnknownExpression(id.to_string()));
        }
        self.expression = Some(id.to_string());
        Ok(())
    }

    fn set_motion(&mut self, group: &str) -> Result<(), AvatarError> {
        if !self.descriptor.has_motion(group) {
            return Err(AvatarError::UnknownMotion(group.to_string()));
        }
        self.motion = Some(group.to_string());
        Ok(())
    }

    fn current_expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    fn current_motion(&self) -> Option<&str> {
        self.motion.as_deref()
    }
}

/// Runtime backed by a local asset directory
#[derive(Clone, Debug)]
pub struct LocalRuntime {
    asset_root: PathBuf,
}

impl Default for LocalRuntime {
    fn default() -> Self {
        Self::new(DEFAULT_ASSET_ROOT)
    }
}

impl LocalRuntime {
    /// Create a runtime rooted at `asset_root`
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
        }
    }

    /// The asset root
    #[must_use]
    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// Resolve a site-style URL (`/models/x.json` or `models/x.json`) under the root
    #[must_use]
    pub fn resolve(&self, url: &str) -> PathBuf {
        self.asset_root.join(url.trim_start_matches('/'))
    }
}

#[async_trait]
impl AvatarRuntime for LocalRuntime {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn load_engine(&self, engine: EngineScript) -> Result<(), AvatarError> {
        let path = self.resolve(engine.relative_path());

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => {
                tracing::debug!(engine = %engine, path = %path.display(), "Engine loaded");
                Ok(())
            }
            Ok(_) => Err(AvatarError::EngineMissing { engine, path }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AvatarError::EngineMissing { engine, path })
            }
            Err(source) => Err(AvatarError::Io { path, source }),
        }
    }

    async fn load_model(
        &self,
        surface: &SurfaceSpec,
        model_url: &str,
    ) -> Result<Box<dyn AvatarModel>, AvatarError> {
        let path = self.resolve(model_url);

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| AvatarError::Io {
                path: path.clone(),
                source,
            })?;

        let descriptor: ModelDescriptor =
            serde_json::from_str(&content).map_err(|source| AvatarError::Descriptor {
                path: path.clone(),
                source,
            })?;

        // Fall back to the model's directory name ("aya" for models/aya/model.json)
        let name = descriptor
            .name
            .clone()
            .or_else(|| {
                path.parent()
                    .and_then(Path::file_name)
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "model".to_string());

        tracing::info!(
            model = %name,
            expressions = descriptor.expressions.len(),
            motion_groups = descriptor.motions.len(),
            "Avatar model loaded"
        );

        Ok(Box::new(DescriptorModel::new(
            name,
            descriptor,
            surface.clone(),
        )))
    }
}
