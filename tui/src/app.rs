//! Main Application
//!
//! The App manages the TUI lifecycle as a thin display client:
//! 1. Converts terminal events to `SurfaceEvent`s
//! 2. Sends them to the embedded Conductor via `ConductorClient`
//! 3. Receives `ConductorMessage`s and updates `DisplayState`
//! 4. Renders based on `DisplayState`

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use pastel_conductor::{ChatBackend, HttpBackend};

use crate::avatar::Avatar;
use crate::conductor_client::ConductorClient;
use crate::display::DisplayState;
use crate::theme::{title_style, BLUSH, CONNECTING_AMBER, DIM_GRAY, PASTEL_PINK, ROSE};
use crate::widgets::{Bubble, MessageList, MessageListState};

/// Chat card title
pub const TITLE: &str = "Pastel*Chat";

/// Shown when the transcript is empty
pub const EMPTY_HINT: &str = "Aya只能解答自己知道的事情哦！（仅限二次元）";

/// Avatar column share of the width
const AVATAR_COLUMN_PERCENT: u16 = 35;

/// Speech bubble height (lines, including border)
const BUBBLE_HEIGHT: u16 = 7;

/// Input box height (lines, including border)
const INPUT_HEIGHT: u16 = 3;

/// Main application state
pub struct App<B: ChatBackend = HttpBackend> {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Conductor Integration ===
    /// Client for communicating with the embedded Conductor
    conductor: ConductorClient<B>,
    /// Display state derived from ConductorMessages
    display: DisplayState,

    // === UI Components ===
    /// The avatar face renderer
    avatar: Avatar,
    /// Message list scroll state
    list_state: MessageListState,

    // === Input State ===
    /// User input buffer
    input_buffer: String,

    // === Misc State ===
    /// Last frame time (for animations)
    last_frame: Instant,
}

impl<B: ChatBackend + 'static> App<B> {
    /// Create a new App around a conductor client
    pub fn new(conductor: ConductorClient<B>) -> Self {
        Self {
            running: true,
            conductor,
            display: DisplayState::new(),
            avatar: Avatar::new(),
            list_state: MessageListState::default(),
            input_buffer: String::new(),
            last_frame: Instant::now(),
        }
    }

    /// Start the Conductor and connect this surface
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.conductor.start().await?;
        self.conductor.connect().await?;
        self.process_conductor_messages();
        Ok(())
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // ~30 FPS is plenty for a blinking face
        let frame_duration = Duration::from_millis(33);

        let mut event_stream = EventStream::new();

        self.start().await?;
        terminal.draw(|frame| self.draw(frame))?;

        while self.running {
            let frame_start = Instant::now();

            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key).await;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Terminal event error");
                        }
                        None => self.running = false,
                    }
                }

                // Frame tick
                () = tokio::time::sleep(Duration::from_millis(16)) => {}
            }

            self.tick().await;
            terminal.draw(|frame| self.draw(frame))?;

            // Frame rate limiting
            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                tokio::time::sleep(frame_duration - elapsed).await;
            }
        }

        Ok(())
    }

    /// One frame of work: apply exchange results, drain messages, animate
    pub async fn tick(&mut self) {
        self.conductor.poll_exchange().await;
        self.process_conductor_messages();

        let now = Instant::now();
        self.avatar.update(now - self.last_frame);
        self.last_frame = now;

        if self.display.quit {
            self.running = false;
        }
    }

    /// Apply all pending messages from the Conductor
    fn process_conductor_messages(&mut self) {
        for msg in self.conductor.recv_all() {
            self.display.apply_message(msg);
        }
    }

    /// Handle keyboard input
    pub async fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            // Quit
            KeyCode::Esc => self.quit().await,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit().await;
            }

            // Submit message
            KeyCode::Enter => self.submit().await,

            // Typing (other Ctrl/Alt chords are not text)
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.input_buffer.push(c);
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }

            // Conversation scrolling
            KeyCode::PageUp => {
                let page = (self.list_state.viewport / 2).max(1);
                self.list_state.scroll_up(page);
            }
            KeyCode::PageDown => {
                let page = (self.list_state.viewport / 2).max(1);
                self.list_state.scroll_down(page);
            }

            _ => {}
        }
    }

    async fn submit(&mut self) {
        if self.display.is_pending() || self.input_buffer.trim().is_empty() {
            return;
        }

        let message = std::mem::take(&mut self.input_buffer);
        if let Err(e) = self.conductor.send_message(message).await {
            tracing::warn!(error = %e, "Failed to send message to conductor");
        }
        self.list_state.follow();
        self.process_conductor_messages();
    }

    async fn quit(&mut self) {
        if let Err(e) = self.conductor.request_quit().await {
            tracing::warn!(error = %e, "Quit request failed");
        }
        self.running = false;
    }

    /// Whether the app is still running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current display state
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Current input text
    pub fn input(&self) -> &str {
        &self.input_buffer
    }

    /// Render the whole UI into a frame
    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(AVATAR_COLUMN_PERCENT),
                Constraint::Percentage(100 - AVATAR_COLUMN_PERCENT),
            ])
            .split(area);

        self.draw_avatar_column(frame, columns[0]);
        self.draw_chat_card(frame, columns[1]);
    }

    fn draw_avatar_column(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(BUBBLE_HEIGHT), Constraint::Min(0)])
            .split(area);

        let persona = if self.display.persona.is_empty() {
            "…"
        } else {
            self.display.persona.as_str()
        };
        frame.render_widget(
            Bubble::new(persona, &self.display.bubble).pending(self.display.is_pending()),
            rows[0],
        );

        self.avatar
            .render(&self.display.avatar, rows[1], frame.buffer_mut());
    }

    fn draw_chat_card(&mut self, frame: &mut Frame, area: Rect) {
        let status_color = if self.display.is_pending() {
            CONNECTING_AMBER
        } else {
            ROSE
        };

        let card = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(PASTEL_PINK))
            .title(Line::from(Span::styled(format!(" {TITLE} "), title_style())))
            .title(
                Line::from(vec![
                    Span::styled("● ", Style::default().fg(status_color)),
                    Span::styled(
                        format!("{} ", self.display.status_label()),
                        Style::default().fg(status_color),
                    ),
                ])
                .alignment(Alignment::Right),
            )
            .title_bottom(
                Line::from(Span::styled(
                    format!(" {} ", self.display.endpoint),
                    Style::default().fg(DIM_GRAY),
                ))
                .alignment(Alignment::Right),
            );
        let inner = card.inner(area);
        frame.render_widget(card, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(INPUT_HEIGHT)])
            .split(inner);

        frame.render_stateful_widget(
            MessageList::new(&self.display.messages).empty_hint(EMPTY_HINT),
            rows[0],
            &mut self.list_state,
        );

        let input_border = if self.display.is_pending() {
            DIM_GRAY
        } else {
            BLUSH
        };
        let input = Paragraph::new(self.input_buffer.as_str())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(input_border))
                    .title(Span::styled(" Enter ↵ ", Style::default().fg(DIM_GRAY))),
            );
        frame.render_widget(input, rows[1]);
    }
}
