//! Theme and Colors
//!
//! One colour per sentiment band, red through green, plus the few UI colours
//! the dashboard chrome needs.

use ratatui::style::Color;

use feargreed_core::Sentiment;

// ============================================================================
// Sentiment Palette
// ============================================================================

/// Extreme fear - deep red
pub const EXTREME_FEAR: Color = Color::Rgb(220, 53, 69);

/// Fear - orange
pub const FEAR: Color = Color::Rgb(253, 126, 20);

/// Neutral - amber
pub const NEUTRAL: Color = Color::Rgb(255, 193, 7);

/// Greed - light green
pub const GREED: Color = Color::Rgb(140, 200, 75);

/// Extreme greed - green
pub const EXTREME_GREED: Color = Color::Rgb(40, 167, 69);

/// Colour for a sentiment band
pub fn sentiment_color(sentiment: Sentiment) -> Color {
    match sentiment {
        Sentiment::ExtremeFear => EXTREME_FEAR,
        Sentiment::Fear => FEAR,
        Sentiment::Neutral => NEUTRAL,
        Sentiment::Greed => GREED,
        Sentiment::ExtremeGreed => EXTREME_GREED,
    }
}

// ============================================================================
// UI Colors
// ============================================================================

/// Titles and accents
pub const ACCENT: Color = Color::Cyan;

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Stale-data warning
pub const WARN_YELLOW: Color = Color::Rgb(255, 200, 80);
