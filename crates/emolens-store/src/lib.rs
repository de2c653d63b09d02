//! EmoLens Store
//!
//! Persistence for fetched video metadata and analysis runs.
//!
//! Provides:
//! - Record types with generated ids and timestamps
//! - The `AnalysisStore` trait, scoped per user
//! - An in-memory store and an append-only JSON-lines store

pub mod jsonl;
pub mod memory;
pub mod record;
pub mod store;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;
pub use record::{AnalysisRecord, VideoRecord};
pub use store::{open_store, AnalysisStore, StoreConfig, StoreKind};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::record::{AnalysisRecord, VideoRecord};
    pub use crate::store::AnalysisStore;
}
