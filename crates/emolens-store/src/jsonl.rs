//! JSON-lines record store
//!
//! Each collection is one append-only file (`videos.jsonl`,
//! `analyses.jsonl`). Files are replayed into memory on open. A summary
//! update appends a new revision of the analysis record; on replay the last
//! revision of an id wins.

use crate::memory::Collections;
use crate::record::{AnalysisRecord, VideoRecord};
use crate::store::AnalysisStore;
use async_trait::async_trait;
use emolens_core::{Error, Result};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const VIDEOS_FILE: &str = "videos.jsonl";
const ANALYSES_FILE: &str = "analyses.jsonl";

/// Store persisting every record to JSON-lines files
pub struct JsonlStore {
    dir: PathBuf,
    collections: RwLock<Collections>,
    videos: Mutex<File>,
    analyses: Mutex<File>,
}

impl JsonlStore {
    /// Open (or create) the store in `dir`, replaying existing records
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::storage(format!("Failed to create store directory {:?}: {}", dir, e)))?;

        let mut collections = Collections::default();
        for record in replay::<VideoRecord>(&dir.join(VIDEOS_FILE)).await? {
            collections.insert_video(record);
        }
        for record in replay::<AnalysisRecord>(&dir.join(ANALYSES_FILE)).await? {
            collections.upsert_analysis(record);
        }

        let (videos, analyses) = collections.counts();
        info!(
            "Loaded {} video records and {} analysis records from {:?}",
            videos, analyses, dir
        );

        Ok(Self {
            videos: Mutex::new(open_append(&dir.join(VIDEOS_FILE)).await?),
            analyses: Mutex::new(open_append(&dir.join(ANALYSES_FILE)).await?),
            collections: RwLock::new(collections),
            dir,
        })
    }

    /// Get the store directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

async fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| Error::storage(format!("Failed to open {:?}: {}", path, e)))
}

/// Read every parseable record; unreadable lines are skipped
async fn replay<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::storage(format!("Failed to read {:?}: {}", path, e))),
    };

    let mut records = Vec::new();
    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping unreadable record at {:?}:{}: {}", path, number + 1, e),
        }
    }
    Ok(records)
}

/// Append one record as a JSON line and flush it
async fn append<T: Serialize>(file: &Mutex<File>, record: &T) -> Result<()> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');

    let mut file = file.lock().await;
    file.write_all(line.as_bytes())
        .await
        .map_err(|e| Error::storage(format!("Failed to append record: {}", e)))?;
    file.flush()
        .await
        .map_err(|e| Error::storage(format!("Failed to flush record: {}", e)))?;
    Ok(())
}

#[async_trait]
impl AnalysisStore for JsonlStore {
    async fn create_video(&self, record: VideoRecord) -> Result<VideoRecord> {
        append(&self.videos, &record).await?;
        self.collections.write().insert_video(record.clone());
        debug!("Saved video record {}", record.id);
        Ok(record)
    }

    async fn latest_video(&self, user_id: &str, video_id: &str) -> Result<Option<VideoRecord>> {
        Ok(self.collections.read().latest_video(user_id, video_id))
    }

    async fn list_videos(&self, user_id: &str) -> Result<Vec<VideoRecord>> {
        Ok(self.collections.read().list_videos(user_id))
    }

    async fn create_analysis(&self, record: AnalysisRecord) -> Result<AnalysisRecord> {
        append(&self.analyses, &record).await?;
        self.collections.write().upsert_analysis(record.clone());
        debug!("Saved analysis record {}", record.id);
        Ok(record)
    }

    async fn latest_analysis(
        &self,
        user_id: &str,
        video_record_id: &str,
    ) -> Result<Option<AnalysisRecord>> {
        Ok(self.collections.read().latest_analysis(user_id, video_record_id))
    }

    async fn update_summary(
        &self,
        analysis_id: &str,
        summary: &str,
    ) -> Result<Option<AnalysisRecord>> {
        let updated = self.collections.read().with_summary(analysis_id, summary);
        let Some(record) = updated else {
            return Ok(None);
        };

        append(&self.analyses, &record).await?;
        self.collections.write().upsert_analysis(record.clone());
        debug!("Saved summary revision of {}", record.id);
        Ok(Some(record))
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}
