//! EmoLens Core
//!
//! Core types, traits, and utilities shared across EmoLens components.
//!
//! This crate provides:
//! - Comment, classification, and aggregate record types
//! - Closed sentiment and emotion label enumerations
//! - Error types and result handling
//! - YouTube video id extraction

pub mod error;
pub mod labels;
pub mod types;
pub mod video_id;

pub use error::{Error, Result};
pub use labels::{EmotionLabel, Label, SentimentLabel};
pub use types::{
    AnalysisAggregate, ClassShare, ClassificationResult, Comment, Dominant, EmotionBreakdown,
    LabeledScore, SentimentBreakdown, TopComment, VideoMetadata,
};
pub use video_id::extract_video_id;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::labels::{EmotionLabel, Label, SentimentLabel};
    pub use crate::types::{AnalysisAggregate, Comment, LabeledScore, VideoMetadata};
}
