//! YouTube Data API v3 client
//!
//! Comments come from `commentThreads` (top-level comments only, paginated
//! with `nextPageToken`); metadata comes from `videos` with the `snippet` and
//! `statistics` parts. Counts arrive as decimal strings.

use crate::config::YouTubeConfig;
use crate::source::{CommentSource, MetadataSource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use emolens_core::{Comment, Error, Result, VideoMetadata};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// YouTube Data API client
pub struct YouTubeClient {
    client: reqwest::Client,
    config: YouTubeConfig,
    api_key: Option<String>,
}

impl YouTubeClient {
    pub fn new(config: YouTubeConfig, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build YouTube client: {e}")))?;

        Ok(Self::with_client(client, config, api_key))
    }

    pub fn with_client(client: reqwest::Client, config: YouTubeConfig, api_key: Option<String>) -> Self {
        Self {
            client,
            config,
            api_key,
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| Error::upstream("No YouTube API key configured"))
    }

    async fn get<T: DeserializeOwned>(&self, resource: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), resource);

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key()?)])
            .send()
            .await
            .map_err(|e| Error::upstream(format!("YouTube {resource} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(format!("YouTube {resource} returned {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("Failed to parse YouTube {resource} reply: {e}")))
    }
}

/// Follow `nextPageToken` until `max_comments` are collected or the listing ends
///
/// A page that adds no comments also ends the listing, even if it carries a
/// token.
async fn collect_pages<F, Fut>(max_comments: usize, page_size: usize, mut fetch: F) -> Result<Vec<Comment>>
where
    F: FnMut(usize, Option<String>) -> Fut,
    Fut: Future<Output = Result<CommentThreadPage>>,
{
    let mut comments = Vec::new();
    let mut page_token: Option<String> = None;

    while comments.len() < max_comments {
        let wanted = page_size.min(max_comments - comments.len());
        let page = fetch(wanted, page_token.take()).await?;

        let before = comments.len();
        comments.extend(page.into_comments_with_token(&mut page_token));
        if page_token.is_none() || comments.len() == before {
            break;
        }
    }

    comments.truncate(max_comments);
    Ok(comments)
}

#[async_trait]
impl CommentSource for YouTubeClient {
    async fn fetch_comments(&self, video_id: &str) -> Result<Vec<Comment>> {
        let page_size = self.config.page_size.clamp(1, 100);

        collect_pages(self.config.max_comments, page_size, move |max_results, page_token| async move {
            let max_results = max_results.to_string();
            let mut query = vec![
                ("part", "snippet"),
                ("videoId", video_id),
                ("maxResults", max_results.as_str()),
                ("textFormat", "plainText"),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let page: CommentThreadPage = self.get("commentThreads", &query).await?;
            debug!("Fetched {} comment threads for {}", page.items.len(), video_id);
            Ok(page)
        })
        .await
    }

    fn name(&self) -> &str {
        "youtube"
    }
}

#[async_trait]
impl MetadataSource for YouTubeClient {
    async fn fetch_metadata(&self, video_id: &str) -> Result<Option<VideoMetadata>> {
        let page: VideoPage = self
            .get("videos", &[("part", "snippet,statistics"), ("id", video_id)])
            .await?;

        Ok(page
            .items
            .into_iter()
            .next()
            .map(|item| item.into_metadata(video_id)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadPage {
    #[serde(default)]
    items: Vec<CommentThread>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl CommentThreadPage {
    /// Consume the page, leaving its continuation token in `token`
    fn into_comments_with_token(self, token: &mut Option<String>) -> impl Iterator<Item = Comment> {
        *token = self.next_page_token.filter(|t| !t.is_empty());
        self.items.into_iter().map(CommentThread::into_comment)
    }
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    #[serde(default)]
    text_original: Option<String>,
    #[serde(default)]
    text_display: Option<String>,
    #[serde(default)]
    author_display_name: Option<String>,
    #[serde(default)]
    like_count: u64,
}

impl CommentThread {
    fn into_comment(self) -> Comment {
        let snippet = self.snippet.top_level_comment.snippet;
        let text = snippet
            .text_original
            .or(snippet.text_display)
            .unwrap_or_default();

        let mut comment = Comment::new(text).with_likes(snippet.like_count);
        if let Some(author) = snippet.author_display_name {
            comment = comment.with_author(author);
        }
        comment
    }
}

#[derive(Debug, Deserialize)]
struct VideoPage {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    #[serde(default)]
    snippet: Option<VideoSnippet>,
    #[serde(default)]
    statistics: Option<VideoStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    channel_title: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    #[serde(default)]
    high: Option<Thumbnail>,
    #[serde(default)]
    medium: Option<Thumbnail>,
    #[serde(default)]
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    #[serde(default)]
    view_count: Option<String>,
    #[serde(default)]
    like_count: Option<String>,
    #[serde(default)]
    comment_count: Option<String>,
}

impl VideoItem {
    fn into_metadata(self, video_id: &str) -> VideoMetadata {
        let mut metadata = VideoMetadata::new(video_id);

        if let Some(snippet) = self.snippet {
            metadata.title = snippet.title;
            metadata.channel_name = snippet.channel_title;
            metadata.published_at = snippet.published_at;
            let thumbnails = snippet.thumbnails;
            metadata.thumbnail = thumbnails
                .high
                .or(thumbnails.medium)
                .or(thumbnails.default)
                .map(|t| t.url);
        }

        if let Some(statistics) = self.statistics {
            metadata.views = parse_count(statistics.view_count);
            metadata.likes = parse_count(statistics.like_count);
            metadata.comment_count = parse_count(statistics.comment_count);
        }

        metadata
    }
}

/// Counts are strings and may be hidden; unparseable counts read as 0
fn parse_count(value: Option<String>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}
