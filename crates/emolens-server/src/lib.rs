//! EmoLens Server
//!
//! HTTP API over the comment-analysis pipeline: fetch a video's comments and
//! metadata, classify them, derive performance metrics, and generate an
//! audience summary. Records are scoped to the user named in the
//! `x-user-id` header.

pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod state;

pub use config::{Cli, Secrets, ServerConfig};
pub use error::{ApiError, Envelope};
pub use routes::create_router;
pub use service::{VideoCard, VideoDetails, VideoService};
pub use state::AppState;
