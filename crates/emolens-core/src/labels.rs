//! Closed label sets produced by the sentiment and emotion classifiers
//!
//! Declaration order matters: it is the tie-break order for dominant label
//! selection, so `ALL` must list variants exactly as declared.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// A closed classification label set
pub trait Label: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Every label, in declaration order
    const ALL: &'static [Self];

    /// Name of the classification axis ("sentiment" or "emotion")
    const AXIS: &'static str;

    /// Canonical lowercase spelling
    fn as_str(&self) -> &'static str;

    /// Parse a label as spelled by a classification model (case-insensitive)
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.as_str().eq_ignore_ascii_case(raw))
    }

    /// Position of this label in declaration order
    fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|label| label == self)
            .unwrap_or(Self::ALL.len())
    }
}

/// Sentiment polarity of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl Label for SentimentLabel {
    const ALL: &'static [Self] = &[Self::Positive, Self::Neutral, Self::Negative];
    const AXIS: &'static str = "sentiment";

    fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

/// Dominant emotion of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Joy,
    Anger,
    Sadness,
    Fear,
    Surprise,
    Disgust,
}

impl Label for EmotionLabel {
    const ALL: &'static [Self] = &[
        Self::Joy,
        Self::Anger,
        Self::Sadness,
        Self::Fear,
        Self::Surprise,
        Self::Disgust,
    ];
    const AXIS: &'static str = "emotion";

    fn as_str(&self) -> &'static str {
        match self {
            Self::Joy => "joy",
            Self::Anger => "anger",
            Self::Sadness => "sadness",
            Self::Fear => "fear",
            Self::Surprise => "surprise",
            Self::Disgust => "disgust",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
