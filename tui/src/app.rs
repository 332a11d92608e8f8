//! Main Application
//!
//! The App struct manages the dashboard lifecycle as a thin display client:
//! - Event loop (keyboard, resize)
//! - IndexClient for synchronization
//! - DisplayState for rendering
//!
//! The loop waits on two sources and redraws after either fires:
//! 1. terminal events from crossterm's async `EventStream`
//! 2. state-change notifications from the index client's watch channel

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use tokio::sync::watch;
use tracing::{debug, warn};

use feargreed_core::{ClientState, IndexBackend, IndexClient, Locale};

use crate::display::{self, DisplayState, ScreenMode};
use crate::theme::{sentiment_color, ACCENT, DIM_GRAY, ERROR_RED, WARN_YELLOW};
use crate::widgets::{JsonPanel, JsonPanelState, MetricCardView, SentimentGauge};

/// Lines scrolled per key press in the raw data panel
const SCROLL_STEP: isize = 3;

/// Main application state
pub struct App<B: IndexBackend> {
    /// Is the app still running?
    running: bool,

    /// Index synchronizer (owns the data)
    client: IndexClient<B>,
    /// State-change notifications from the client
    updates: watch::Receiver<ClientState>,
    /// Display state derived from the latest client state
    display: DisplayState,
    /// Label language
    locale: Locale,

    /// Raw data panel visible
    show_raw: bool,
    /// Raw data panel scroll position
    raw_panel: JsonPanelState,
}

impl<B: IndexBackend> App<B> {
    /// Create an App around a (not yet started) client
    pub fn new(client: IndexClient<B>, locale: Locale) -> Self {
        let updates = client.subscribe();
        let display = DisplayState::from_client_state(&updates.borrow(), locale);
        Self {
            running: true,
            client,
            updates,
            display,
            locale,
            show_raw: false,
            raw_panel: JsonPanelState::default(),
        }
    }

    /// Main event loop. Starts the client's schedule and stops it on exit.
    pub async fn run<T: Backend>(&mut self, terminal: &mut Terminal<T>) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();

        self.client.start();

        // Render initial frame immediately so the user sees the loading state
        terminal.draw(|frame| self.draw(frame))?;

        while self.running {
            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(event)) => self.handle_event(event),
                    Some(Err(e)) => warn!(error = %e, "Terminal event error"),
                    None => self.running = false,
                },

                changed = self.updates.changed() => {
                    if changed.is_err() {
                        self.running = false;
                    } else {
                        self.sync_display();
                    }
                }
            }

            terminal.draw(|frame| self.draw(frame))?;
        }

        self.client.stop();
        Ok(())
    }

    /// Rebuild the display state from the latest client state
    pub fn sync_display(&mut self) {
        let state = self.updates.borrow_and_update().clone();
        self.display = DisplayState::from_client_state(&state, self.locale);
    }

    fn handle_event(&mut self, event: Event) {
        // Only handle Press events (not Release or Repeat). Resizes need no
        // handling: layout is recomputed on every draw.
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key);
            }
        }
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            // Quit
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }

            // Manual refresh; the result arrives through the watch channel
            KeyCode::Char('r') => {
                debug!("Manual refresh requested");
                let client = self.client.clone();
                tokio::spawn(async move {
                    client.refresh().await;
                });
            }

            // Raw data panel
            KeyCode::Char('d') => {
                self.show_raw = !self.show_raw;
                self.raw_panel.reset();
            }
            KeyCode::Down | KeyCode::Char('j') if self.show_raw => {
                self.raw_panel.scroll(SCROLL_STEP);
            }
            KeyCode::Up | KeyCode::Char('k') if self.show_raw => {
                self.raw_panel.scroll(-SCROLL_STEP);
            }

            _ => {}
        }
    }

    /// Is the app still running?
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the raw data panel is shown
    pub fn shows_raw(&self) -> bool {
        self.show_raw
    }

    /// Current display state
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Draw one frame
    pub fn draw(&mut self, frame: &mut Frame) {
        let [header, body, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        self.render_header(frame, header);

        match &self.display.screen {
            ScreenMode::FullError { message } => {
                let message = message.clone();
                Self::render_full_error(frame, body, &message);
            }
            ScreenMode::Dashboard { stale_notice } => {
                let stale_notice = stale_notice.clone();
                self.render_dashboard(frame, body, stale_notice.as_deref());
            }
        }

        self.render_status(frame, status);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled(
                display::title(self.locale),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(self.display.header.as_str(), Style::default().fg(DIM_GRAY)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_full_error(frame: &mut Frame, area: Rect, message: &str) {
        let [_, middle, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(3),
            Constraint::Fill(1),
        ])
        .areas(area);

        let paragraph = Paragraph::new(Span::styled(
            message,
            Style::default().fg(ERROR_RED).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::bordered().border_style(Style::default().fg(ERROR_RED)));
        frame.render_widget(paragraph, middle);
    }

    fn render_dashboard(&mut self, frame: &mut Frame, area: Rect, stale_notice: Option<&str>) {
        let [notice, headline, gauge, rest] = Layout::vertical([
            Constraint::Length(u16::from(stale_notice.is_some())),
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .areas(area);

        if let Some(text) = stale_notice {
            frame.render_widget(
                Paragraph::new(Span::styled(text, Style::default().fg(WARN_YELLOW))),
                notice,
            );
        }

        let headline_style = self
            .display
            .headline_sentiment
            .map_or(Style::default(), |s| Style::default().fg(sentiment_color(s)))
            .add_modifier(Modifier::BOLD);
        let mut spans = Vec::new();
        if self.display.headline_sentiment.is_some() {
            spans.push(Span::styled(
                format!("{:.1}  ", self.display.gauge_value),
                headline_style,
            ));
        }
        spans.push(Span::styled(self.display.headline.as_str(), headline_style));
        frame.render_widget(
            Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
            headline,
        );

        frame.render_widget(SentimentGauge::new(self.display.gauge_value), gauge);

        let (cards_area, raw_area) = if self.show_raw {
            let [cards, raw] =
                Layout::vertical([Constraint::Length(8), Constraint::Min(0)]).areas(rest);
            (cards, Some(raw))
        } else {
            (rest, None)
        };

        if !self.display.cards.is_empty() {
            let columns = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(cards_area);
            for (card, column) in self.display.cards.iter().zip(columns.iter()) {
                frame.render_widget(MetricCardView::new(card), *column);
            }
        }

        if let Some(raw_area) = raw_area {
            let block = Block::bordered()
                .title(" raw data ")
                .border_style(Style::default().fg(DIM_GRAY));
            let inner = block.inner(raw_area);
            frame.render_widget(block, raw_area);

            let content = self.display.raw_json.as_deref().unwrap_or("{}");
            frame.render_stateful_widget(
                JsonPanel::new(content).style(Style::default().fg(ACCENT)),
                inner,
                &mut self.raw_panel,
            );
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let status = display::status_line(&self.display, self.locale, self.show_raw);
        frame.render_widget(
            Paragraph::new(Span::styled(status, Style::default().fg(DIM_GRAY))),
            area,
        );
    }
}
