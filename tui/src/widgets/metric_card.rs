//! Metric Card
//!
//! Bordered panel for one sub-indicator: explanation, raw figure, score and
//! band. The border takes the band colour.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::display::MetricCard;
use crate::theme::{sentiment_color, DIM_GRAY};

/// Renders a [`MetricCard`]
pub struct MetricCardView<'a> {
    card: &'a MetricCard,
}

impl<'a> MetricCardView<'a> {
    pub fn new(card: &'a MetricCard) -> Self {
        Self { card }
    }
}

impl Widget for MetricCardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let color = sentiment_color(self.card.sentiment);

        let block = Block::bordered()
            .title(Span::styled(
                format!(" {} ", self.card.title),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .border_style(Style::default().fg(color));
        let inner = block.inner(area);
        block.render(area, buf);

        let lines = vec![
            Line::from(Span::styled(
                self.card.raw_figure.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::raw(format!("{} ", self.card.score)),
                Span::styled(self.card.category, Style::default().fg(color)),
            ]),
            Line::default(),
            Line::from(Span::styled(
                self.card.description,
                Style::default().fg(DIM_GRAY),
            )),
        ];

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
