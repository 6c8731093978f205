//! TOML Configuration File Support
//!
//! Configuration for the chat front-end, loaded from
//! `~/.config/pastel-chat/config.toml`.
//!
//! # Configuration Priority
//!
//! Values are applied in this order (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! endpoint = "http://localhost:8000/chat"
//! timeout_secs = 30
//!
//! [avatar]
//! enabled = true
//! asset_root = "public"
//! model_path = "models/aya/model.json"
//!
//! [avatar.expressions]
//! smile = "f01"
//! cry = "f04"
//!
//! [persona]
//! name = "丸山彩"
//! thinking = "正在检索记忆..."
//! ```
//!
//! # Environment Variables
//!
//! - `PASTEL_ENDPOINT`: chat endpoint URL
//! - `PASTEL_TIMEOUT_SECS`: request timeout (`0` disables)
//! - `PASTEL_ASSET_ROOT`: avatar asset directory
//! - `PASTEL_AVATAR`: `0` or `false` disables the avatar

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::avatar::{DEFAULT_ASSET_ROOT, DEFAULT_MODEL_PATH};
use crate::backend::DEFAULT_ENDPOINT;
use crate::expression::ExpressionMap;
use crate::session::SessionTexts;

/// Persona name shown on the speech bubble
pub const DEFAULT_PERSONA: &str = "丸山彩";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Backend section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendToml {
    /// Chat endpoint URL
    pub endpoint: Option<String>,

    /// Request timeout in seconds (absent = no timeout)
    pub timeout_secs: Option<u64>,
}

/// Avatar section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarToml {
    /// Whether to load the avatar at all
    pub enabled: Option<bool>,

    /// Directory holding engine scripts and models
    pub asset_root: Option<PathBuf>,

    /// Model descriptor path relative to the asset root
    pub model_path: Option<String>,

    /// Expression identifier overrides
    pub expressions: Option<ExpressionMap>,
}

/// Persona section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaToml {
    /// Name shown on the bubble
    pub name: Option<String>,

    /// Bubble text before the first exchange
    pub greeting: Option<String>,

    /// Reply text when the backend sends none
    pub fallback_reply: Option<String>,

    /// Bubble text after a failed exchange
    pub connection_failure: Option<String>,

    /// Bubble text while waiting
    pub thinking: Option<String>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PastelToml {
    /// Backend section
    pub backend: BackendToml,

    /// Avatar section
    pub avatar: AvatarToml,

    /// Persona section
    pub persona: PersonaToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration
///
/// Use [`load_config`] to build this from all sources.
#[derive(Clone, Debug)]
pub struct PastelConfig {
    /// Chat endpoint URL
    pub endpoint: String,

    /// Request timeout (None = wait indefinitely)
    pub timeout: Option<Duration>,

    /// Whether to load the avatar
    pub avatar_enabled: bool,

    /// Directory holding engine scripts and models
    pub asset_root: PathBuf,

    /// Model descriptor path relative to the asset root
    pub model_path: String,

    /// Expression identifiers
    pub expressions: ExpressionMap,

    /// Persona name
    pub persona: String,

    /// Display texts for the session
    pub texts: SessionTexts,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for PastelConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
            avatar_enabled: true,
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            model_path: DEFAULT_MODEL_PATH.to_string(),
            expressions: ExpressionMap::default(),
            persona: DEFAULT_PERSONA.to_string(),
            texts: SessionTexts::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl PastelConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Check values that would make the front-end unusable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for an empty or non-HTTP
    /// endpoint or an empty model path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::ValidationError(
                "backend endpoint must not be empty".to_string(),
            ));
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "backend endpoint must be an http(s) URL, got {endpoint:?}"
            )));
        }
        if self.avatar_enabled && self.model_path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "avatar model path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/pastel-chat/config.toml` when a config dir is known.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pastel-chat").join("config.toml"))
}

/// Load configuration from the default path and the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed,
/// or if the result fails validation.
pub fn load_config() -> Result<PastelConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the process environment
///
/// A missing file is not an error (defaults are used).
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the result
/// fails validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<PastelConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with an injectable environment lookup
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<PastelConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = load_config_unvalidated_with_env(path, env)?;
    config.validate()?;
    Ok(config)
}

/// Load file and environment layers without validating
///
/// For callers that still apply [`ConfigOverrides`], which validates the
/// final result.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_unvalidated(path: Option<PathBuf>) -> Result<PastelConfig, ConfigError> {
    load_config_unvalidated_with_env(path, |key| std::env::var(key).ok())
}

/// [`load_config_unvalidated`] with an injectable environment lookup
///
/// # Errors
///
/// Same as [`load_config_unvalidated`].
pub fn load_config_unvalidated_with_env<F>(
    path: Option<PathBuf>,
    env: F,
) -> Result<PastelConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = PastelConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: PastelToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut PastelConfig, toml: PastelToml) {
    // Backend
    if let Some(endpoint) = toml.backend.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(secs) = toml.backend.timeout_secs {
        config.timeout = timeout_from_secs(secs);
    }

    // Avatar
    if let Some(enabled) = toml.avatar.enabled {
        config.avatar_enabled = enabled;
    }
    if let Some(root) = toml.avatar.asset_root {
        config.asset_root = root;
    }
    if let Some(model_path) = toml.avatar.model_path {
        config.model_path = model_path;
    }
    if let Some(expressions) = toml.avatar.expressions {
        config.expressions = expressions;
    }

    // Persona
    if let Some(name) = toml.persona.name {
        config.persona = name;
    }
    if let Some(greeting) = toml.persona.greeting {
        config.texts.greeting = greeting;
    }
    if let Some(fallback) = toml.persona.fallback_reply {
        config.texts.fallback_reply = fallback;
    }
    if let Some(failure) = toml.persona.connection_failure {
        config.texts.connection_failure = failure;
    }
    if let Some(thinking) = toml.persona.thinking {
        config.texts.thinking = thinking;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut PastelConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(endpoint) = env("PASTEL_ENDPOINT") {
        config.endpoint = endpoint;
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = env("PASTEL_TIMEOUT_SECS") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.timeout = timeout_from_secs(secs);
            config.source = ConfigSource::Env;
        } else {
            tracing::warn!(value = %timeout, "Ignoring non-numeric PASTEL_TIMEOUT_SECS");
        }
    }
    if let Some(root) = env("PASTEL_ASSET_ROOT") {
        config.asset_root = PathBuf::from(root);
        config.source = ConfigSource::Env;
    }
    if let Some(enabled) = env("PASTEL_AVATAR") {
        config.avatar_enabled = enabled != "0" && enabled.to_lowercase() != "false";
        config.source = ConfigSource::Env;
    }
}

/// `0` means "no timeout"
fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config_unvalidated`] to apply command-line argument
/// overrides. [`ConfigOverrides::apply`] validates the merged result.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Endpoint override
    pub endpoint: Option<String>,

    /// Asset root override
    pub asset_root: Option<PathBuf>,

    /// Disable the avatar
    pub no_avatar: bool,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set endpoint override
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set asset root override
    #[must_use]
    pub fn with_asset_root(mut self, root: PathBuf) -> Self {
        self.asset_root = Some(root);
        self
    }

    /// Disable the avatar
    #[must_use]
    pub fn without_avatar(mut self) -> Self {
        self.no_avatar = true;
        self
    }

    /// Apply overrides to a configuration
    ///
    /// # Errors
    ///
    /// Returns a validation error if the overridden configuration is invalid.
    pub fn apply(&self, config: &mut PastelConfig) -> Result<(), ConfigError> {
        if self.endpoint.is_some() || self.asset_root.is_some() || self.no_avatar {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref endpoint) = self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(ref root) = self.asset_root {
            config.asset_root = root.clone();
        }
        if self.no_avatar {
            config.avatar_enabled = false;
        }

        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
