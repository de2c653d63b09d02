//! In-memory record store

use crate::record::{AnalysisRecord, VideoRecord};
use crate::store::AnalysisStore;
use async_trait::async_trait;
use chrono::Utc;
use emolens_core::Result;
use parking_lot::RwLock;
use std::collections::HashSet;

/// Records in insertion order; later entries are newer
#[derive(Debug, Default)]
pub(crate) struct Collections {
    videos: Vec<VideoRecord>,
    analyses: Vec<AnalysisRecord>,
}

impl Collections {
    pub(crate) fn insert_video(&mut self, record: VideoRecord) {
        self.videos.push(record);
    }

    /// Insert, or replace the record with the same id in place
    pub(crate) fn upsert_analysis(&mut self, record: AnalysisRecord) {
        match self.analyses.iter_mut().find(|a| a.id == record.id) {
            Some(existing) => *existing = record,
            None => self.analyses.push(record),
        }
    }

    pub(crate) fn latest_video(&self, user_id: &str, video_id: &str) -> Option<VideoRecord> {
        self.videos
            .iter()
            .rev()
            .find(|v| v.user_id == user_id && v.video_id() == video_id)
            .cloned()
    }

    pub(crate) fn list_videos(&self, user_id: &str) -> Vec<VideoRecord> {
        let mut seen = HashSet::new();
        self.videos
            .iter()
            .rev()
            .filter(|v| v.user_id == user_id && seen.insert(v.video_id().to_string()))
            .cloned()
            .collect()
    }

    pub(crate) fn latest_analysis(&self, user_id: &str, video_record_id: &str) -> Option<AnalysisRecord> {
        self.analyses
            .iter()
            .rev()
            .find(|a| a.user_id == user_id && a.video_record_id == video_record_id)
            .cloned()
    }

    /// Copy of the analysis with its summary replaced; the index is unchanged
    pub(crate) fn with_summary(&self, analysis_id: &str, summary: &str) -> Option<AnalysisRecord> {
        self.analyses
            .iter()
            .find(|a| a.id == analysis_id)
            .map(|existing| {
                let mut updated = existing.clone();
                updated.aggregate.set_summary(summary);
                updated.updated_at = Utc::now();
                updated
            })
    }

    pub(crate) fn counts(&self) -> (usize, usize) {
        (self.videos.len(), self.analyses.len())
    }
}

/// Store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn create_video(&self, record: VideoRecord) -> Result<VideoRecord> {
        self.collections.write().insert_video(record.clone());
        Ok(record)
    }

    async fn latest_video(&self, user_id: &str, video_id: &str) -> Result<Option<VideoRecord>> {
        Ok(self.collections.read().latest_video(user_id, video_id))
    }

    async fn list_videos(&self, user_id: &str) -> Result<Vec<VideoRecord>> {
        Ok(self.collections.read().list_videos(user_id))
    }

    async fn create_analysis(&self, record: AnalysisRecord) -> Result<AnalysisRecord> {
        self.collections.write().upsert_analysis(record.clone());
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
        let mut collections = self.collections.write();
        let updated = collections.with_summary(analysis_id, summary);
        if let Some(record) = &updated {
            collections.upsert_analysis(record.clone());
        }
        Ok(updated)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emolens_core::{AnalysisAggregate, VideoMetadata};

    fn video(user: &str, video_id: &str, title: &str) -> VideoRecord {
        let mut metadata = VideoMetadata::new(video_id);
        metadata.title = Some(title.to_string());
        VideoRecord::new(user, metadata)
    }

    #[tokio::test]
    async fn test_latest_video_is_newest_for_user() {
        let store = MemoryStore::new();
        store.create_video(video("alice", "aaaaaaaaaaa", "v1")).await.unwrap();
        store.create_video(video("alice", "aaaaaaaaaaa", "v2")).await.unwrap();
        store.create_video(video("bob", "aaaaaaaaaaa", "bob's")).await.unwrap();

        let latest = store.latest_video("alice", "aaaaaaaaaaa").await.unwrap().unwrap();
        assert_eq!(latest.metadata.title.as_deref(), Some("v2"));

        assert!(store.latest_video("carol", "aaaaaaaaaaa").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_videos_dedups_newest_first() {
        let store = MemoryStore::new();
        store.create_video(video("alice", "aaaaaaaaaaa", "a1")).await.unwrap();
        store.create_video(video("alice", "bbbbbbbbbbb", "b1")).await.unwrap();
        store.create_video(video("alice", "aaaaaaaaaaa", "a2")).await.unwrap();
        store.create_video(video("bob", "ccccccccccc", "c1")).await.unwrap();

        let titles: Vec<String> = store
            .list_videos("alice")
            .await
            .unwrap()
            .into_iter()
            .filter_map(|v| v.metadata.title)
            .collect();
        assert_eq!(titles, vec!["a2", "b1"]);
    }

    #[tokio::test]
    async fn test_reanalysis_adds_record_and_summary_updates_latest() {
        let store = MemoryStore::new();
        let record = store.create_video(video("alice", "aaaaaaaaaaa", "t")).await.unwrap();

        let first = store
            .create_analysis(AnalysisRecord::new(&record, AnalysisAggregate::empty()))
            .await
            .unwrap();
        let second = store
            .create_analysis(AnalysisRecord::new(&record, AnalysisAggregate::empty()))
            .await
            .unwrap();
        assert_ne!(first.id, second.id);

        let latest = store.latest_analysis("alice", &record.id).await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);

        store.update_summary(&latest.id, "first draft").await.unwrap();
        let updated = store.update_summary(&latest.id, "final").await.unwrap().unwrap();
        assert_eq!(updated.summary(), Some("final"));

        let reread = store.latest_analysis("alice", &record.id).await.unwrap().unwrap();
        assert_eq!(reread.summary(), Some("final"));
        assert_eq!(store.collections.read().counts(), (1, 2));
        assert!(store.latest_analysis("bob", &record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_unknown_analysis_is_none() {
        let store = MemoryStore::new();
        assert!(store.update_summary("ana_missing", "x").await.unwrap().is_none());
    }
}
