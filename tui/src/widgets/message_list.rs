//! MessageList Widget
//!
//! A borderless, scrollable list of chat messages. User messages are
//! right-aligned, AI messages left-aligned. Scrolling is counted in lines
//! from the bottom so the list follows new messages until the user scrolls
//! up.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::StatefulWidget;
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use crate::display::DisplayMessage;
use crate::theme::{hint_style, BLUSH, USER_LAVENDER};

/// Share of the width a single message may take
const MESSAGE_WIDTH_PERCENT: usize = 80;

/// Scroll state for the message list
#[derive(Debug, Default)]
pub struct MessageListState {
    /// Lines from the bottom (0 = follow newest)
    pub scroll_offset: usize,
    /// Total content lines at last render
    pub total_lines: usize,
    /// Visible height at last render
    pub viewport: usize,
}

impl MessageListState {
    /// Scroll towards older messages
    pub fn scroll_up(&mut self, lines: usize) {
        let max = self.total_lines.saturating_sub(self.viewport);
        self.scroll_offset = (self.scroll_offset + lines).min(max);
    }

    /// Scroll towards newer messages
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Jump back to the newest message
    pub fn follow(&mut self) {
        self.scroll_offset = 0;
    }

    /// Whether the list is pinned to the newest message
    pub fn is_following(&self) -> bool {
        self.scroll_offset == 0
    }
}

/// A scrollable chat transcript
pub struct MessageList<'a> {
    messages: &'a [DisplayMessage],
    empty_hint: &'a str,
}

impl<'a> MessageList<'a> {
    /// Create a list over `messages`
    pub fn new(messages: &'a [DisplayMessage]) -> Self {
        Self {
            messages,
            empty_hint: "",
        }
    }

    /// Text shown when there are no messages
    #[must_use]
    pub fn empty_hint(mut self, hint: &'a str) -> Self {
        self.empty_hint = hint;
        self
    }

    /// Wrap and align every message for a given width
    pub fn layout_lines(&self, width: usize) -> Vec<(String, Style)> {
        let max_width = (width * MESSAGE_WIDTH_PERCENT / 100).max(1);
        let mut lines = Vec::new();

        for msg in self.messages {
            let style = if msg.is_right_aligned() {
                Style::default().fg(USER_LAVENDER)
            } else {
                Style::default().fg(BLUSH)
            };

            for raw in msg.content.lines() {
                if raw.is_empty() {
                    lines.push((String::new(), style));
                    continue;
                }
                for wrapped in wrap(raw, max_width) {
                    let text = wrapped.to_string();
                    let line = if msg.is_right_aligned() {
                        let pad = width.saturating_sub(text.width());
                        format!("{}{}", " ".repeat(pad), text)
                    } else {
                        text
                    };
                    lines.push((line, style));
                }
            }
            lines.push((String::new(), Style::default()));
        }

        lines
    }
}

impl StatefulWidget for MessageList<'_> {
    type State = MessageListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let height = area.height as usize;
        state.viewport = height;

        if self.messages.is_empty() {
            state.total_lines = 0;
            state.scroll_offset = 0;
            if area.height > 0 {
                let hint_width = u16::try_from(self.empty_hint.width()).unwrap_or(area.width);
                let x = area.x + area.width.saturating_sub(hint_width) / 2;
                let y = area.y + area.height / 2;
                buf.set_stringn(x, y, self.empty_hint, area.width as usize, hint_style());
            }
            return;
        }

        let lines = self.layout_lines(area.width as usize);
        state.total_lines = lines.len();

        // Clamp scroll
        let max_scroll = state.total_lines.saturating_sub(height);
        state.scroll_offset = state.scroll_offset.min(max_scroll);

        let visible_end = state.total_lines.saturating_sub(state.scroll_offset);
        let visible_start = visible_end.saturating_sub(height);

        for (i, (line, style)) in lines[visible_start..visible_end].iter().enumerate() {
            let y = area.y + u16::try_from(i).unwrap_or(u16::MAX);
            buf.set_stringn(area.x, y, line, area.width as usize, *style);
        }
    }
}
