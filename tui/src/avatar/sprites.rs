//! Sprite Definitions
//!
//! Faces drawn with Unicode block elements. Each cell carries its own
//! foreground color. Every expression shares one head pattern and swaps the
//! palette entries for eyes, mouth and extras.

use std::collections::HashMap;

use ratatui::style::Color;

use pastel_conductor::Expression;

use crate::theme::{ANGER_RED, CHEEK, DIM_GRAY, FACE, PASTEL_PINK, TEAR};

/// Eye and mouth color
const INK: Color = Color::Rgb(60, 40, 50);

/// A single colored cell in a sprite
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColoredCell {
    /// The character to display
    pub ch: char,
    /// Foreground color
    pub fg: Color,
}

impl ColoredCell {
    /// Create a new colored cell
    pub const fn new(ch: char, fg: Color) -> Self {
        Self { ch, fg }
    }

    /// Empty/transparent cell
    pub const fn empty() -> Self {
        Self {
            ch: ' ',
            fg: Color::Reset,
        }
    }

    /// Check if cell is empty/transparent
    pub fn is_empty(&self) -> bool {
        self.ch == ' '
    }
}

/// One still image
#[derive(Clone, Debug)]
pub struct Frame {
    /// 2D grid of colored cells (row-major)
    pub cells: Vec<Vec<ColoredCell>>,
    /// Width in terminal cells
    pub width: u16,
    /// Height in terminal cells
    pub height: u16,
}

impl Frame {
    /// Create a frame from a grid of colored cells
    pub fn new(cells: Vec<Vec<ColoredCell>>) -> Self {
        let height = u16::try_from(cells.len()).unwrap_or(u16::MAX);
        let width = cells
            .iter()
            .map(|row| u16::try_from(row.len()).unwrap_or(u16::MAX))
            .max()
            .unwrap_or(0);

        Self {
            cells,
            width,
            height,
        }
    }

    /// Get cell at position (returns empty if out of bounds)
    pub fn get(&self, x: u16, y: u16) -> &ColoredCell {
        static EMPTY: ColoredCell = ColoredCell::empty();
        self.cells
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .unwrap_or(&EMPTY)
    }
}

/// Parse a sprite pattern using a palette
///
/// Each pattern character maps to a `(char, Color)` in the palette. A space
/// is always transparent. Unknown characters are drawn as-is.
pub fn build_frame(pattern: &[&str], palette: &[(char, char, Color)]) -> Frame {
    let color_map: HashMap<char, (char, Color)> = palette
        .iter()
        .map(|&(key, ch, color)| (key, (ch, color)))
        .collect();

    let cells = pattern
        .iter()
        .map(|line| {
            line.chars()
                .map(|c| {
                    if c == ' ' {
                        ColoredCell::empty()
                    } else if let Some(&(ch, color)) = color_map.get(&c) {
                        ColoredCell::new(ch, color)
                    } else {
                        ColoredCell::new(c, Color::Reset)
                    }
                })
                .collect()
        })
        .collect();

    Frame::new(cells)
}

// ============================================================================
// Faces
// ============================================================================

/// l/r: eyes, m: mouth, c: cheeks, t: tears, x: anger mark
const HEAD: &[&str] = &[
    "   HHHHHHH  x",
    "  HHHHHHHHH  ",
    " HHFFFFFFFHH ",
    " HFFlFFFrFFH ",
    " HFcFFFFFcFH ",
    " HtFFFmFFFtH ",
    "  FFFFFFFFF  ",
];

/// Palette entries shared by every face
fn base_palette() -> Vec<(char, char, Color)> {
    vec![('H', '█', PASTEL_PINK), ('F', '█', FACE)]
}

/// Face parts for an expression: (left eye, right eye, mouth, cheeks, tears, anger mark)
fn parts(expression: Expression) -> (char, char, char, bool, bool, bool) {
    match expression {
        Expression::Neutral => ('•', '•', '─', false, false, false),
        Expression::Smile => ('^', '^', '‿', false, false, false),
        Expression::Cry => ('T', 'T', '∩', false, true, false),
        Expression::Shy => ('>', '<', 'ω', true, false, false),
        Expression::Anger => ('╲', '╱', '∧', false, false, true),
    }
}

fn face_palette(expression: Expression, blink: bool) -> Vec<(char, char, Color)> {
    let (left, right, mouth, cheeks, tears, anger) = parts(expression);
    let (left, right) = if blink { ('─', '─') } else { (left, right) };

    let mut palette = base_palette();
    palette.push(('l', left, INK));
    palette.push(('r', right, INK));
    palette.push(('m', mouth, INK));
    palette.push(('c', if cheeks { '▒' } else { '█' }, if cheeks { CHEEK } else { FACE }));
    palette.push(('t', if tears { '╏' } else { '█' }, if tears { TEAR } else { FACE }));
    if anger {
        palette.push(('x', '#', ANGER_RED));
    } else {
        palette.push(('x', ' ', Color::Reset));
    }
    palette
}

/// The face for an expression
pub fn face(expression: Expression) -> Frame {
    build_frame(HEAD, &face_palette(expression, false))
}

/// The face with eyes closed
pub fn blinking_face(expression: Expression) -> Frame {
    build_frame(HEAD, &face_palette(expression, true))
}

/// Shown while the model is loading or unavailable
pub fn placeholder() -> Frame {
    build_frame(
        &[
            "   ┌ ─ ─ ─ ┐   ",
            "             ",
            "   │   ?   │   ",
            "             ",
            "   └ ─ ─ ─ ┘   ",
        ],
        &[
            ('┌', '┌', DIM_GRAY),
            ('┐', '┐', DIM_GRAY),
            ('└', '└', DIM_GRAY),
            ('┘', '┘', DIM_GRAY),
            ('─', '─', DIM_GRAY),
            ('│', '│', DIM_GRAY),
            ('?', '?', DIM_GRAY),
        ],
    )
}
