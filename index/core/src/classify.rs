//! Sentiment Classification
//!
//! Maps a 0-100 score onto one of five sentiment bands. The same table is
//! used for the composite index and for every sub-metric.
//!
//! | Score range       | Category        |
//! |-------------------|-----------------|
//! | `score < 20`      | `extreme-fear`  |
//! | `20 <= score < 45`| `fear`          |
//! | `45 <= score < 55`| `neutral`       |
//! | `55 <= score < 80`| `greed`         |
//! | `score >= 80`     | `extreme-greed` |
//!
//! Lower bounds are inclusive, so `classify(20.0)` is [`Sentiment::Fear`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lower bound of the `fear` band
pub const FEAR_THRESHOLD: f64 = 20.0;
/// Lower bound of the `neutral` band
pub const NEUTRAL_THRESHOLD: f64 = 45.0;
/// Lower bound of the `greed` band
pub const GREED_THRESHOLD: f64 = 55.0;
/// Lower bound of the `extreme-greed` band
pub const EXTREME_GREED_THRESHOLD: f64 = 80.0;

/// Score used by consumers when no snapshot exists yet
pub const NEUTRAL_SCORE: f64 = 50.0;

/// One of the five sentiment bands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sentiment {
    /// Below 20
    ExtremeFear,
    /// 20 up to 45
    Fear,
    /// 45 up to 55
    Neutral,
    /// 55 up to 80
    Greed,
    /// 80 and above
    ExtremeGreed,
}

impl Sentiment {
    /// All bands, from most fearful to most greedy
    pub const ALL: [Sentiment; 5] = [
        Self::ExtremeFear,
        Self::Fear,
        Self::Neutral,
        Self::Greed,
        Self::ExtremeGreed,
    ];

    /// Stable machine identifier (e.g. `extreme-fear`)
    #[must_use]
    pub fn category_id(self) -> &'static str {
        match self {
            Self::ExtremeFear => "extreme-fear",
            Self::Fear => "fear",
            Self::Neutral => "neutral",
            Self::Greed => "greed",
            Self::ExtremeGreed => "extreme-greed",
        }
    }

    /// English display label
    #[must_use]
    pub fn label(self) -> &'static str {
        self.label_in(Locale::English)
    }

    /// Display label in the given locale
    #[must_use]
    pub fn label_in(self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::English, Self::ExtremeFear) => "Extreme Fear",
            (Locale::English, Self::Fear) => "Fear",
            (Locale::English, Self::Neutral) => "Neutral",
            (Locale::English, Self::Greed) => "Greed",
            (Locale::English, Self::ExtremeGreed) => "Extreme Greed",
            (Locale::Korean, Self::ExtremeFear) => "극단적 공포",
            (Locale::Korean, Self::Fear) => "공포",
            (Locale::Korean, Self::Neutral) => "중립",
            (Locale::Korean, Self::Greed) => "탐욕",
            (Locale::Korean, Self::ExtremeGreed) => "극단적 탐욕",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category_id())
    }
}

/// Classify a score into its sentiment band.
///
/// Total over all `f64` values: anything below 0 lands in
/// [`Sentiment::ExtremeFear`], anything above 100 in
/// [`Sentiment::ExtremeGreed`]. NaN has no nearest band and is treated as the
/// neutral default.
#[must_use]
pub fn classify(score: f64) -> Sentiment {
    if score.is_nan() {
        Sentiment::Neutral
    } else if score < FEAR_THRESHOLD {
        Sentiment::ExtremeFear
    } else if score < NEUTRAL_THRESHOLD {
        Sentiment::Fear
    } else if score < GREED_THRESHOLD {
        Sentiment::Neutral
    } else if score < EXTREME_GREED_THRESHOLD {
        Sentiment::Greed
    } else {
        Sentiment::ExtremeGreed
    }
}

/// Language used for user-facing labels and messages
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    /// English (default)
    #[default]
    #[serde(rename = "en")]
    English,
    /// Korean, as shown by the original KOSPI dashboard
    #[serde(rename = "ko")]
    Korean,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "ko" | "kr" | "korean" => Ok(Self::Korean),
            other => Err(format!("unknown locale '{other}' (expected 'en' or 'ko')")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::English => f.write_str("en"),
            Self::Korean => f.write_str("ko"),
        }
    }
}
