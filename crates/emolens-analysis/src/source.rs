//! Comment and metadata source traits

use async_trait::async_trait;
use emolens_core::{Comment, Result, VideoMetadata};

/// Supplies the raw top-level comments of a video
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Fetch comments for `video_id`, in the order the platform returns them
    async fn fetch_comments(&self, video_id: &str) -> Result<Vec<Comment>>;

    /// Get the source name
    fn name(&self) -> &str;
}

/// Supplies descriptive metadata of a video
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch metadata; `None` when the platform knows no such video
    async fn fetch_metadata(&self, video_id: &str) -> Result<Option<VideoMetadata>>;
}
