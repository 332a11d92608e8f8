//! JSON Panel Widget
//!
//! A borderless, scrollable view of the raw snapshot as pretty-printed JSON.
//! Long lines are wrapped to the panel width.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::StatefulWidget;
use textwrap::wrap;

/// Scroll state for the JSON panel
#[derive(Debug, Default)]
pub struct JsonPanelState {
    /// Scroll offset (lines from top)
    pub scroll_offset: usize,
    /// Total wrapped lines at the last render
    pub total_lines: usize,
}

impl JsonPanelState {
    /// Scroll by delta (positive = down)
    pub fn scroll(&mut self, delta: isize) {
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta);
    }

    /// Back to the first line
    pub fn reset(&mut self) {
        self.scroll_offset = 0;
    }
}

/// Scrollable raw JSON text
pub struct JsonPanel<'a> {
    content: &'a str,
    style: Style,
}

impl<'a> JsonPanel<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            style: Style::default(),
        }
    }

    /// Text style for every line
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl StatefulWidget for JsonPanel<'_> {
    type State = JsonPanelState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let wrapped: Vec<String> = self
            .content
            .lines()
            .flat_map(|line| {
                if line.is_empty() {
                    vec![String::new()]
                } else {
                    wrap(line, area.width as usize)
                        .into_iter()
                        .map(|cow| cow.into_owned())
                        .collect()
                }
            })
            .collect();

        state.total_lines = wrapped.len();

        // Clamp so the last page stays full
        let max_scroll = state.total_lines.saturating_sub(area.height as usize);
        state.scroll_offset = state.scroll_offset.min(max_scroll);

        for (i, line) in wrapped
            .iter()
            .skip(state.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            buf.set_string(area.x, area.y + i as u16, line, self.style);
        }
    }
}
