//! Avatar Expressions
//!
//! The backend tags each reply with an emotion label. This module turns that
//! free-form label into a closed set of expressions, then into the identifier
//! the loaded avatar model understands.

use serde::{Deserialize, Serialize};

/// Facial expression the avatar can show
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    /// Default/idle face
    #[default]
    Neutral,
    /// Happy face
    Smile,
    /// Sad face
    Cry,
    /// Embarrassed face
    Shy,
    /// Angry face
    Anger,
}

impl Expression {
    /// All expressions, neutral first
    pub const ALL: [Expression; 5] = [
        Self::Neutral,
        Self::Smile,
        Self::Cry,
        Self::Shy,
        Self::Anger,
    ];

    /// Resolve a backend emotion label
    ///
    /// Total: missing or unrecognized labels resolve to [`Expression::Neutral`].
    /// Matching is exact.
    #[must_use]
    pub fn from_emotion(label: Option<&str>) -> Self {
        match label {
            Some("smile") => Self::Smile,
            Some("cry") => Self::Cry,
            Some("shy") => Self::Shy,
            Some("anger") => Self::Anger,
            _ => Self::Neutral,
        }
    }

    /// Descriptive face name
    #[must_use]
    pub fn face_name(&self) -> &'static str {
        match self {
            Self::Neutral => "idle-face",
            Self::Smile => "happy-face",
            Self::Cry => "sad-face",
            Self::Shy => "embarrassed-face",
            Self::Anger => "angry-face",
        }
    }
}

/// Maps expressions to avatar-runtime identifiers
///
/// Defaults match the expression files shipped with the bundled model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionMap {
    /// Identifier for [`Expression::Neutral`]
    pub neutral: String,
    /// Identifier for [`Expression::Smile`]
    pub smile: String,
    /// Identifier for [`Expression::Cry`]
    pub cry: String,
    /// Identifier for [`Expression::Shy`]
    pub shy: String,
    /// Identifier for [`Expression::Anger`]
    pub anger: String,
}

impl Default for ExpressionMap {
    fn default() -> Self {
        Self {
            neutral: "f01".to_string(),
            smile: "f01".to_string(),
            cry: "f04".to_string(),
            shy: "f02".to_string(),
            anger: "f03".to_string(),
        }
    }
}

impl ExpressionMap {
    /// Runtime identifier for an expression
    #[must_use]
    pub fn id(&self, expression: Expression) -> &str {
        match expression {
            Expression::Neutral => &self.neutral,
            Expression::Smile => &self.smile,
            Expression::Cry => &self.cry,
            Expression::Shy => &self.shy,
            Expression::Anger => &self.anger,
        }
    }
}
