//! Sentiment Gauge
//!
//! A horizontal 0-100 bar coloured by band, with a marker under the current
//! value and a scale line below it.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Widget;

use feargreed_core::{classify, NEUTRAL_SCORE};

use crate::theme::{sentiment_color, DIM_GRAY};

/// Horizontal fear/greed gauge
pub struct SentimentGauge {
    value: f64,
}

impl SentimentGauge {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

/// Column of the marker for `value` on a bar `width` cells wide
pub fn marker_column(value: f64, width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    let value = if value.is_nan() {
        NEUTRAL_SCORE
    } else {
        value.clamp(0.0, 100.0)
    };
    let last = f64::from(width - 1);
    (value / 100.0 * last).round() as u16
}

impl Widget for SentimentGauge {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height == 0 {
            return;
        }

        let marker = marker_column(self.value, area.width);
        let last = f64::from(area.width - 1);

        // Bar: filled up to the marker in band colours, track after it
        for x in 0..area.width {
            let score = f64::from(x) / last * 100.0;
            let (symbol, style) = if x <= marker {
                ("█", Style::default().fg(sentiment_color(classify(score))))
            } else {
                ("░", Style::default().fg(DIM_GRAY))
            };
            buf.set_string(area.x + x, area.y, symbol, style);
        }

        if area.height > 1 {
            let color = sentiment_color(classify(self.value));
            buf.set_string(
                area.x + marker,
                area.y + 1,
                "▲",
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            );
        }

        if area.height > 2 {
            let y = area.y + 2;
            let dim = Style::default().fg(DIM_GRAY);
            buf.set_string(area.x, y, "0", dim);
            buf.set_string(area.x + area.width / 2 - 1, y, "50", dim);
            buf.set_string(area.x + area.width - 3, y, "100", dim);
        }
    }
}
