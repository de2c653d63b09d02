//! Store trait and construction from configuration

use crate::jsonl::JsonlStore;
use crate::memory::MemoryStore;
use crate::record::{AnalysisRecord, VideoRecord};
use async_trait::async_trait;
use emolens_core::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Durable storage for video and analysis records
///
/// Records are scoped to their owning user: no lookup returns another user's
/// records. Creating never overwrites; every fetch or analysis adds a record.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Save a metadata snapshot
    async fn create_video(&self, record: VideoRecord) -> Result<VideoRecord>;

    /// Most recent metadata snapshot of `video_id` for `user_id`
    async fn latest_video(&self, user_id: &str, video_id: &str) -> Result<Option<VideoRecord>>;

    /// Most recent snapshot of every video of `user_id`, newest first
    async fn list_videos(&self, user_id: &str) -> Result<Vec<VideoRecord>>;

    /// Save an analysis run
    async fn create_analysis(&self, record: AnalysisRecord) -> Result<AnalysisRecord>;

    /// Most recent analysis made for a video record
    async fn latest_analysis(
        &self,
        user_id: &str,
        video_record_id: &str,
    ) -> Result<Option<AnalysisRecord>>;

    /// Replace the summary of an analysis; `None` when no such record exists
    async fn update_summary(&self, analysis_id: &str, summary: &str)
        -> Result<Option<AnalysisRecord>>;

    /// Get the store name
    fn name(&self) -> &str;
}

/// Backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Process memory; records are lost on restart
    #[default]
    Memory,
    /// Append-only JSON-lines files
    Jsonl,
}

/// Configuration for record persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,

    /// Directory holding the JSON-lines files
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            dir: default_store_dir(),
        }
    }
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("./data")
}

/// Open the configured store
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn AnalysisStore>> {
    let store: Arc<dyn AnalysisStore> = match config.kind {
        StoreKind::Memory => Arc::new(MemoryStore::new()),
        StoreKind::Jsonl => Arc::new(JsonlStore::open(&config.dir).await?),
    };

    info!("Opened {} record store", store.name());
    Ok(store)
}
