//! Avatar Panel
//!
//! Draws the persona's face in the left column. The face follows the last
//! expression the Conductor reported and blinks now and then. Until the
//! avatar model has loaded (or if it never does) a placeholder is drawn.

mod sprites;

use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

use crate::display::AvatarDisplay;
use crate::theme::DIM_GRAY;

pub use sprites::{blinking_face, build_frame, face, placeholder, ColoredCell, Frame};

/// Time between blinks
const BLINK_INTERVAL: Duration = Duration::from_millis(4000);

/// How long the eyes stay closed
const BLINK_LENGTH: Duration = Duration::from_millis(150);

/// The face renderer
#[derive(Debug, Default)]
pub struct Avatar {
    /// Time since the last blink started
    since_blink: Duration,
}

impl Avatar {
    /// Create a new avatar
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the blink timer (call every frame)
    pub fn update(&mut self, delta: Duration) {
        self.since_blink += delta;
        if self.since_blink >= BLINK_INTERVAL {
            self.since_blink = Duration::ZERO;
        }
    }

    /// Whether the eyes are closed this frame
    pub fn is_blinking(&self) -> bool {
        self.since_blink < BLINK_LENGTH
    }

    /// The frame to draw for the given avatar display state
    pub fn frame(&self, display: &AvatarDisplay) -> Frame {
        match display {
            AvatarDisplay::Ready { expression, .. } => {
                if self.is_blinking() {
                    blinking_face(*expression)
                } else {
                    face(*expression)
                }
            }
            AvatarDisplay::Loading | AvatarDisplay::Unavailable { .. } => placeholder(),
        }
    }

    /// Render centered in `area`, with a caption line below
    pub fn render(&self, display: &AvatarDisplay, area: Rect, buf: &mut Buffer) {
        let frame = self.frame(display);
        let caption = caption(display);

        let total_height = frame.height + 1;
        let x0 = area.x + area.width.saturating_sub(frame.width) / 2;
        let y0 = area.y + area.height.saturating_sub(total_height) / 2;

        for y in 0..frame.height.min(area.height) {
            for x in 0..frame.width.min(area.width) {
                let cell = frame.get(x, y);
                if cell.is_empty() {
                    continue;
                }
                let (px, py) = (x0 + x, y0 + y);
                if px < area.right() && py < area.bottom() {
                    buf[(px, py)]
                        .set_char(cell.ch)
                        .set_style(Style::default().fg(cell.fg));
                }
            }
        }

        let caption_y = y0 + frame.height;
        if caption_y < area.bottom() {
            let width = u16::try_from(unicode_width::UnicodeWidthStr::width(caption.as_str()))
                .unwrap_or(area.width)
                .min(area.width);
            let cx = area.x + area.width.saturating_sub(width) / 2;
            buf.set_stringn(
                cx,
                caption_y,
                &caption,
                area.width as usize,
                Style::default().fg(DIM_GRAY),
            );
        }
    }
}

/// One line under the face
fn caption(display: &AvatarDisplay) -> String {
    match display {
        AvatarDisplay::Loading => "loading...".to_string(),
        AvatarDisplay::Ready { expression, .. } => expression.face_name().to_string(),
        AvatarDisplay::Unavailable { .. } => "avatar not loaded".to_string(),
    }
}
