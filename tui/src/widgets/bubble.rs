//! Speech Bubble Widget
//!
//! A rounded box above the avatar with the persona name as its title.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap};

use crate::theme::{persona_style, BLUSH, CONNECTING_AMBER};

/// The speech bubble
pub struct Bubble<'a> {
    persona: &'a str,
    text: &'a str,
    pending: bool,
}

impl<'a> Bubble<'a> {
    /// A bubble for `persona` saying `text`
    pub fn new(persona: &'a str, text: &'a str) -> Self {
        Self {
            persona,
            text,
            pending: false,
        }
    }

    /// Draw the text in the waiting color
    #[must_use]
    pub fn pending(mut self, pending: bool) -> Self {
        self.pending = pending;
        self
    }
}

impl Widget for Bubble<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BLUSH))
            .title(Line::from(Span::styled(format!(" {} ", self.persona), persona_style())));

        let text_style = if self.pending {
            Style::default().fg(CONNECTING_AMBER)
        } else {
            Style::default()
        };

        Paragraph::new(self.text)
            .style(text_style)
            .wrap(Wrap { trim: true })
            .block(block)
            .render(area, buf);
    }
}
