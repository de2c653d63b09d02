//! Request-level operations behind the HTTP routes
//!
//! Each operation runs sequentially within the request that triggered it.
//! Lookups always go through the caller's own records, newest first.

use emolens_analysis::{
    derive_metrics, AnalysisConfig, AnalysisPipeline, ClassificationBackend, CommentSource,
    DerivedMetrics, MetadataSource, NarrativeGenerator, NarrativeSummarizer,
};
use emolens_core::{
    extract_video_id, Comment, EmotionLabel, Error, Result, SentimentLabel,
};
use emolens_store::{AnalysisRecord, AnalysisStore, VideoRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

pub const METADATA_NOT_FOUND: &str = "Video metadata not found!! Please fetch the video first.";
pub const ANALYSIS_NOT_FOUND: &str = "Analysis record not found!! Please analyze the video first.";

/// Preview of one fetched video for a listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCard {
    pub id: String,
    pub video_id: String,
    pub title: Option<String>,
    pub channel_name: Option<String>,
    pub thumbnail: Option<String>,
    pub views: u64,
    pub likes: u64,
    pub comment_count: u64,
    pub published_at: Option<DateTime<Utc>>,
    pub fetched_at: DateTime<Utc>,
    pub analyzed: bool,
    pub total_comments: Option<u64>,
    pub dominant_sentiment: Option<SentimentLabel>,
    pub dominant_emotion: Option<EmotionLabel>,
}

impl VideoCard {
    fn new(video: VideoRecord, analysis: Option<&AnalysisRecord>) -> Self {
        let aggregate = analysis.map(|a| &a.aggregate);
        Self {
            id: video.id,
            video_id: video.metadata.video_id,
            title: video.metadata.title,
            channel_name: video.metadata.channel_name,
            thumbnail: video.metadata.thumbnail,
            views: video.metadata.views,
            likes: video.metadata.likes,
            comment_count: video.metadata.comment_count,
            published_at: video.metadata.published_at,
            fetched_at: video.created_at,
            analyzed: aggregate.is_some(),
            total_comments: aggregate.map(|a| a.total_comments),
            dominant_sentiment: aggregate.and_then(|a| a.dominant_sentiment).map(|d| d.label),
            dominant_emotion: aggregate.and_then(|a| a.dominant_emotion).map(|d| d.label),
        }
    }
}

/// Everything known about one video
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    pub video: VideoRecord,
    pub analysis: Option<AnalysisRecord>,
    /// `None` when no analysis is available
    pub metrics: Option<DerivedMetrics>,
}

/// Comment analysis service shared by all requests
pub struct VideoService {
    store: Arc<dyn AnalysisStore>,
    comments: Arc<dyn CommentSource>,
    metadata: Arc<dyn MetadataSource>,
    pipeline: AnalysisPipeline,
    summarizer: NarrativeSummarizer,
}

impl VideoService {
    pub fn new(
        config: &AnalysisConfig,
        store: Arc<dyn AnalysisStore>,
        comments: Arc<dyn CommentSource>,
        metadata: Arc<dyn MetadataSource>,
        backend: Arc<dyn ClassificationBackend>,
        generator: Arc<dyn NarrativeGenerator>,
    ) -> Result<Self> {
        Ok(Self {
            pipeline: AnalysisPipeline::from_config(config, comments.clone(), backend)?,
            summarizer: NarrativeSummarizer::new(generator)?,
            store,
            comments,
            metadata,
        })
    }

    pub fn store(&self) -> &Arc<dyn AnalysisStore> {
        &self.store
    }

    /// Raw comments of the video at `url`
    pub async fn fetch_comments(&self, url: &str) -> Result<(String, Vec<Comment>)> {
        let video_id = extract_video_id(url)?;
        let comments = self.comments.fetch_comments(&video_id).await?;
        info!("Fetched {} comments for {}", comments.len(), video_id);
        Ok((video_id, comments))
    }

    /// Fetch metadata of the video at `url` and save a snapshot for `user_id`
    pub async fn fetch_metadata(&self, user_id: &str, url: &str) -> Result<VideoRecord> {
        let video_id = extract_video_id(url)?;
        let metadata = self
            .metadata
            .fetch_metadata(&video_id)
            .await?
            .ok_or_else(|| Error::validation("No video meta data found!!"))?;

        let record = self
            .store
            .create_video(VideoRecord::new(user_id, metadata))
            .await?;
        info!("Saved metadata snapshot {} of {} for {}", record.id, video_id, user_id);
        Ok(record)
    }

    /// Analyze the comments of a previously fetched video
    ///
    /// Every call saves a new analysis record; earlier ones are kept.
    pub async fn analyze(&self, user_id: &str, url: &str) -> Result<AnalysisRecord> {
        let video_id = extract_video_id(url)?;
        let video = self.latest_video(user_id, &video_id).await?;

        let execution = self.pipeline.run(&video_id).await?;
        let record = self
            .store
            .create_analysis(AnalysisRecord::new(&video, execution.aggregate))
            .await?;

        metrics::counter!("emolens_analyses_total").increment(1);
        info!(
            "Saved analysis {} of {} ({} comments, {}us)",
            record.id, video_id, record.aggregate.total_comments, execution.total_latency_us
        );
        Ok(record)
    }

    /// Performance metrics of the latest analysis of the video at `url`
    pub async fn video_metrics(&self, user_id: &str, url: &str) -> Result<(AnalysisRecord, DerivedMetrics)> {
        let video_id = extract_video_id(url)?;
        let (_, analysis) = self.latest_pair(user_id, &video_id).await?;
        let metrics = derive_metrics(&analysis.aggregate);
        Ok((analysis, metrics))
    }

    /// Generate and save a summary for the video at `url`
    pub async fn summarize_url(&self, user_id: &str, url: &str) -> Result<String> {
        let video_id = extract_video_id(url)?;
        self.summarize(user_id, &video_id).await
    }

    /// Generate and save a summary for a video id
    pub async fn summarize_video(&self, user_id: &str, video_id: &str) -> Result<String> {
        let video_id = video_id.trim();
        if video_id.is_empty() {
            return Err(Error::validation("Video id is required!!"));
        }
        self.summarize(user_id, video_id).await
    }

    async fn summarize(&self, user_id: &str, video_id: &str) -> Result<String> {
        let (video, analysis) = self.latest_pair(user_id, video_id).await?;

        // A generator failure leaves the saved analysis untouched
        let summary = self
            .summarizer
            .summarize(&analysis.aggregate, Some(&video.metadata))
            .await?;

        self.store
            .update_summary(&analysis.id, &summary)
            .await?
            .ok_or_else(|| Error::validation(ANALYSIS_NOT_FOUND))?;
        info!("Saved summary of analysis {}", analysis.id);
        Ok(summary)
    }

    /// Cards for every video `user_id` has fetched, newest first
    pub async fn video_cards(&self, user_id: &str) -> Result<Vec<VideoCard>> {
        let videos = self.store.list_videos(user_id).await?;
        let mut cards = Vec::with_capacity(videos.len());

        for video in videos {
            let analysis = self.supplementary_analysis(user_id, &video).await;
            cards.push(VideoCard::new(video, analysis.as_ref()));
        }
        Ok(cards)
    }

    /// Latest metadata, analysis, and metrics of a video
    pub async fn video_details(&self, user_id: &str, video_id: &str) -> Result<VideoDetails> {
        let video_id = video_id.trim();
        if video_id.is_empty() {
            return Err(Error::validation("Invalid Video Id!!"));
        }

        let video = self
            .store
            .latest_video(user_id, video_id)
            .await?
            .ok_or_else(|| Error::validation("Video Not found!!"))?;

        let analysis = self.supplementary_analysis(user_id, &video).await;
        let metrics = analysis.as_ref().map(|a| derive_metrics(&a.aggregate));

        Ok(VideoDetails {
            video,
            analysis,
            metrics,
        })
    }

    async fn latest_video(&self, user_id: &str, video_id: &str) -> Result<VideoRecord> {
        self.store
            .latest_video(user_id, video_id)
            .await?
            .ok_or_else(|| Error::validation(METADATA_NOT_FOUND))
    }

    /// Latest metadata snapshot and the latest analysis made for it
    async fn latest_pair(&self, user_id: &str, video_id: &str) -> Result<(VideoRecord, AnalysisRecord)> {
        let video = self.latest_video(user_id, video_id).await?;
        let analysis = self
            .store
            .latest_analysis(user_id, &video.id)
            .await?
            .ok_or_else(|| Error::validation(ANALYSIS_NOT_FOUND))?;
        Ok((video, analysis))
    }

    /// Analysis shown next to a video; a lookup failure only hides it
    async fn supplementary_analysis(&self, user_id: &str, video: &VideoRecord) -> Option<AnalysisRecord> {
        match self.store.latest_analysis(user_id, &video.id).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Analysis of {} unavailable: {}", video.id, e);
                None
            }
        }
    }
}
