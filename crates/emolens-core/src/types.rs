//! Core types for EmoLens

use crate::labels::{EmotionLabel, Label, SentimentLabel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single top-level comment fetched from a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Comment text
    pub text: String,

    /// Display name of the author
    #[serde(default)]
    pub author: String,

    /// Number of likes on the comment
    #[serde(default)]
    pub like_count: u64,
}

impl Comment {
    /// Create a comment with only text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: String::new(),
            like_count: 0,
        }
    }

    /// Set the author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the like count
    pub fn with_likes(mut self, likes: u64) -> Self {
        self.like_count = likes;
        self
    }
}

/// A label with the classifier's confidence (0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledScore<L> {
    pub label: L,
    pub score: f64,
}

impl<L> LabeledScore<L> {
    pub fn new(label: L, score: f64) -> Self {
        Self { label, score }
    }
}

/// Both classifier outputs for one comment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub sentiment: LabeledScore<SentimentLabel>,
    pub emotion: LabeledScore<EmotionLabel>,
}

/// Count and share of one class
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassShare {
    pub count: u64,

    /// Percentage of all comments, 0-100
    pub percentage: f64,
}

/// Per-class shares on the sentiment axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: ClassShare,
    pub neutral: ClassShare,
    pub negative: ClassShare,
}

impl SentimentBreakdown {
    pub fn get(&self, label: SentimentLabel) -> &ClassShare {
        match label {
            SentimentLabel::Positive => &self.positive,
            SentimentLabel::Neutral => &self.neutral,
            SentimentLabel::Negative => &self.negative,
        }
    }

    pub fn get_mut(&mut self, label: SentimentLabel) -> &mut ClassShare {
        match label {
            SentimentLabel::Positive => &mut self.positive,
            SentimentLabel::Neutral => &mut self.neutral,
            SentimentLabel::Negative => &mut self.negative,
        }
    }

    /// Shares in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (SentimentLabel, &ClassShare)> {
        SentimentLabel::ALL.iter().map(move |label| (*label, self.get(*label)))
    }
}

/// Per-class shares on the emotion axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionBreakdown {
    pub joy: ClassShare,
    pub anger: ClassShare,
    pub sadness: ClassShare,
    pub fear: ClassShare,
    pub surprise: ClassShare,
    pub disgust: ClassShare,
}

impl EmotionBreakdown {
    pub fn get(&self, label: EmotionLabel) -> &ClassShare {
        match label {
            EmotionLabel::Joy => &self.joy,
            EmotionLabel::Anger => &self.anger,
            EmotionLabel::Sadness => &self.sadness,
            EmotionLabel::Fear => &self.fear,
            EmotionLabel::Surprise => &self.surprise,
            EmotionLabel::Disgust => &self.disgust,
        }
    }

    pub fn get_mut(&mut self, label: EmotionLabel) -> &mut ClassShare {
        match label {
            EmotionLabel::Joy => &mut self.joy,
            EmotionLabel::Anger => &mut self.anger,
            EmotionLabel::Sadness => &mut self.sadness,
            EmotionLabel::Fear => &mut self.fear,
            EmotionLabel::Surprise => &mut self.surprise,
            EmotionLabel::Disgust => &mut self.disgust,
        }
    }

    /// Shares in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (EmotionLabel, &ClassShare)> {
        EmotionLabel::ALL.iter().map(move |label| (*label, self.get(*label)))
    }
}

/// The most frequent label on one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dominant<L> {
    pub label: L,
    pub count: u64,
}

/// A representative comment kept on the aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopComment {
    pub text: String,
    pub emotion: LabeledScore<EmotionLabel>,
}

/// Durable result of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisAggregate {
    pub total_comments: u64,

    pub sentiment: SentimentBreakdown,

    pub emotion: EmotionBreakdown,

    /// None when there are no comments
    pub dominant_sentiment: Option<Dominant<SentimentLabel>>,

    /// None when there are no comments
    pub dominant_emotion: Option<Dominant<EmotionLabel>>,

    #[serde(default)]
    pub top_positive_comments: Vec<TopComment>,

    #[serde(default)]
    pub top_negative_comments: Vec<TopComment>,

    /// LLM narrative, set by a later summary request
    #[serde(default)]
    pub summary: Option<String>,
}

impl AnalysisAggregate {
    /// Aggregate of zero comments
    pub fn empty() -> Self {
        Self {
            total_comments: 0,
            sentiment: SentimentBreakdown::default(),
            emotion: EmotionBreakdown::default(),
            dominant_sentiment: None,
            dominant_emotion: None,
            top_positive_comments: Vec::new(),
            top_negative_comments: Vec::new(),
            summary: None,
        }
    }

    /// Replace the narrative summary (last write wins)
    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = Some(summary.into());
    }
}

/// Video metadata captured when a video is first fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub video_id: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub channel_name: Option<String>,

    #[serde(default)]
    pub thumbnail: Option<String>,

    #[serde(default)]
    pub views: u64,

    #[serde(default)]
    pub likes: u64,

    #[serde(default)]
    pub comment_count: u64,

    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

impl VideoMetadata {
    /// Metadata with only the video id known
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            title: None,
            channel_name: None,
            thumbnail: None,
            views: 0,
            likes: 0,
            comment_count: 0,
            published_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_iter_follows_declaration_order() {
        let mut breakdown = EmotionBreakdown::default();
        breakdown.get_mut(EmotionLabel::Fear).count = 3;

        let labels: Vec<_> = breakdown.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, EmotionLabel::ALL);
        assert_eq!(breakdown.fear.count, 3);
    }

    #[test]
    fn test_aggregate_json_shape() {
        let mut aggregate = AnalysisAggregate::empty();
        aggregate.set_summary("Mostly positive.");

        let json = serde_json::to_value(&aggregate).unwrap();
        assert_eq!(json["totalComments"], 0);
        assert_eq!(json["sentiment"]["positive"]["count"], 0);
        assert!(json["dominantSentiment"].is_null());
        assert_eq!(json["summary"], "Mostly positive.");

        let back: AnalysisAggregate = serde_json::from_value(json).unwrap();
        assert_eq!(back, aggregate);
    }
}
