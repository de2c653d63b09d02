//! Behaviour every store implementation must share

use emolens_core::{AnalysisAggregate, VideoMetadata};
use emolens_store::{open_store, AnalysisRecord, AnalysisStore, StoreConfig, StoreKind, VideoRecord};
use std::sync::Arc;
use tempfile::TempDir;

fn metadata(video_id: &str, title: &str) -> VideoMetadata {
    let mut metadata = VideoMetadata::new(video_id);
    metadata.title = Some(title.to_string());
    metadata.views = 1000;
    metadata
}

async fn exercise(store: Arc<dyn AnalysisStore>) {
    // Analysis attaches to the metadata snapshot it was made for
    let first = store
        .create_video(VideoRecord::new("alice", metadata("aaaaaaaaaaa", "first fetch")))
        .await
        .unwrap();
    let old_analysis = store
        .create_analysis(AnalysisRecord::new(&first, AnalysisAggregate::empty()))
        .await
        .unwrap();

    let refetched = store
        .create_video(VideoRecord::new("alice", metadata("aaaaaaaaaaa", "second fetch")))
        .await
        .unwrap();
    assert!(store
        .latest_analysis("alice", &refetched.id)
        .await
        .unwrap()
        .is_none());

    let mut aggregate = AnalysisAggregate::empty();
    aggregate.total_comments = 42;
    let new_analysis = store
        .create_analysis(AnalysisRecord::new(&refetched, aggregate))
        .await
        .unwrap();

    let latest_video = store.latest_video("alice", "aaaaaaaaaaa").await.unwrap().unwrap();
    assert_eq!(latest_video.id, refetched.id);

    let latest = store
        .latest_analysis("alice", &latest_video.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, new_analysis.id);
    assert_eq!(latest.aggregate.total_comments, 42);

    // Summary mutates only the targeted record
    store.update_summary(&latest.id, "Audience loved it").await.unwrap();
    let summarized = store
        .latest_analysis("alice", &latest_video.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(summarized.summary(), Some("Audience loved it"));
    assert!(summarized.updated_at >= summarized.created_at);

    let untouched = store.latest_analysis("alice", &first.id).await.unwrap().unwrap();
    assert_eq!(untouched.id, old_analysis.id);
    assert!(untouched.summary().is_none());

    // Records stay private to their user
    assert!(store.latest_video("bob", "aaaaaaaaaaa").await.unwrap().is_none());
    assert!(store.list_videos("bob").await.unwrap().is_empty());
    assert_eq!(store.list_videos("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_memory_store_contract() {
    let store = open_store(&StoreConfig::default()).await.unwrap();
    assert_eq!(store.name(), "memory");
    exercise(store).await;
}

#[tokio::test]
async fn test_jsonl_store_contract() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig {
        kind: StoreKind::Jsonl,
        dir: dir.path().to_path_buf(),
    };

    let store = open_store(&config).await.unwrap();
    assert_eq!(store.name(), "jsonl");
    exercise(store).await;
}
