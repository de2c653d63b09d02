//! Persisted record types

use chrono::{DateTime, Utc};
use emolens_core::{AnalysisAggregate, VideoMetadata};
use serde::{Deserialize, Serialize};

/// A metadata snapshot saved when a user fetches a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    /// Unique record ID
    pub id: String,

    /// Owning user
    pub user_id: String,

    #[serde(flatten)]
    pub metadata: VideoMetadata,

    pub created_at: DateTime<Utc>,
}

impl VideoRecord {
    pub fn new(user_id: impl Into<String>, metadata: VideoMetadata) -> Self {
        Self {
            id: generate_id("vid"),
            user_id: user_id.into(),
            metadata,
            created_at: Utc::now(),
        }
    }

    pub fn video_id(&self) -> &str {
        &self.metadata.video_id
    }
}

/// One analysis run, linked to the video record it was made for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    /// Unique record ID
    pub id: String,

    /// Owning user
    pub user_id: String,

    /// The video record this analysis belongs to
    pub video_record_id: String,

    pub video_id: String,

    #[serde(flatten)]
    pub aggregate: AnalysisAggregate,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(video: &VideoRecord, aggregate: AnalysisAggregate) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id("ana"),
            user_id: video.user_id.clone(),
            video_record_id: video.id.clone(),
            video_id: video.metadata.video_id.clone(),
            aggregate,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn summary(&self) -> Option<&str> {
        self.aggregate.summary.as_deref()
    }
}

/// Generate a unique record ID using UUID v4
fn generate_id(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_prefixed_and_unique() {
        let video = VideoRecord::new("user-1", VideoMetadata::new("dQw4w9WgXcQ"));
        let other = VideoRecord::new("user-1", VideoMetadata::new("dQw4w9WgXcQ"));
        assert!(video.id.starts_with("vid_"));
        assert_ne!(video.id, other.id);

        let analysis = AnalysisRecord::new(&video, AnalysisAggregate::empty());
        assert!(analysis.id.starts_with("ana_"));
        assert_eq!(analysis.video_record_id, video.id);
        assert_eq!(analysis.video_id, "dQw4w9WgXcQ");
        assert_eq!(analysis.user_id, "user-1");
    }

    #[test]
    fn test_record_json_is_flat() {
        let mut metadata = VideoMetadata::new("dQw4w9WgXcQ");
        metadata.title = Some("Launch".to_string());
        let video = VideoRecord::new("user-1", metadata);

        let json = serde_json::to_value(&video).unwrap();
        assert_eq!(json["videoId"], "dQw4w9WgXcQ");
        assert_eq!(json["title"], "Launch");
        assert_eq!(json["userId"], "user-1");

        let back: VideoRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, video);

        let analysis = AnalysisRecord::new(&video, AnalysisAggregate::empty());
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["totalComments"], 0);
        assert_eq!(json["videoRecordId"], video.id.as_str());
    }
}
