//! Theme and Colors
//!
//! Pastel Chat's palette: soft pinks for the persona, a lavender accent for
//! the user and muted grays for chrome.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Persona Palette
// ============================================================================

/// Signature pink (titles, persona name)
pub const PASTEL_PINK: Color = Color::Rgb(255, 153, 204);

/// Light pink (bubble border, AI messages)
pub const BLUSH: Color = Color::Rgb(255, 204, 229);

/// Deep pink (status dot while online)
pub const ROSE: Color = Color::Rgb(236, 72, 153);

/// Face outline
pub const FACE: Color = Color::Rgb(255, 228, 225);

/// Cheek blush for the shy face
pub const CHEEK: Color = Color::Rgb(255, 130, 160);

/// Tears
pub const TEAR: Color = Color::Rgb(150, 200, 255);

/// Anger mark
pub const ANGER_RED: Color = Color::Rgb(255, 90, 90);

// ============================================================================
// UI Colors
// ============================================================================

/// User messages
pub const USER_LAVENDER: Color = Color::Rgb(196, 181, 253);

/// Hints and placeholders
pub const DIM_GRAY: Color = Color::Rgb(120, 120, 120);

/// Status while waiting for a reply
pub const CONNECTING_AMBER: Color = Color::Rgb(250, 204, 21);

/// Title bar style
pub fn title_style() -> Style {
    Style::default()
        .fg(PASTEL_PINK)
        .add_modifier(Modifier::BOLD)
}

/// Persona name on the bubble
pub fn persona_style() -> Style {
    Style::default().fg(ROSE).add_modifier(Modifier::BOLD)
}

/// Hint text
pub fn hint_style() -> Style {
    Style::default()
        .fg(DIM_GRAY)
        .add_modifier(Modifier::ITALIC)
}
