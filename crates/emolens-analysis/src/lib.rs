//! EmoLens Analysis
//!
//! The comment-analysis pipeline behind EmoLens.
//!
//! Stages, leaf-first:
//! - Text normalization: strip markup, links, and emoji before classification
//! - Batch classification: sentiment and emotion labels from a hosted model API
//! - Aggregation: counts, percentages, dominant labels, and top comments
//! - Performance metrics: five scalar scores derived from an aggregate
//! - Narrative: LLM prompt construction and reply cleanup
//!
//! Every stage runs sequentially within one request; batches are never fanned
//! out in parallel.

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod gateway;
pub mod huggingface;
pub mod narrative;
pub mod normalize;
pub mod performance;
pub mod pipeline;
pub mod prompt;
pub mod source;
pub mod youtube;

pub use aggregate::Aggregator;
pub use classifier::{ClassificationBackend, RawScore};
pub use config::{AnalysisConfig, GatewayConfig, LlmConfig, ModelsConfig, YouTubeConfig};
pub use gateway::BatchClassifier;
pub use huggingface::HuggingFaceBackend;
pub use narrative::{GroqClient, NarrativeGenerator, NarrativeSummarizer};
pub use normalize::TextNormalizer;
pub use performance::{derive_metrics, DerivedMetrics, NormalizedMetrics, RiskBand};
pub use pipeline::{AnalysisExecution, AnalysisPipeline, PipelineStage, StageTiming};
pub use prompt::{build_prompt, ReplyFormatter};
pub use source::{CommentSource, MetadataSource};
pub use youtube::YouTubeClient;

/// Round `value` to `places` decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::aggregate::Aggregator;
    pub use crate::classifier::ClassificationBackend;
    pub use crate::gateway::BatchClassifier;
    pub use crate::normalize::TextNormalizer;
    pub use crate::performance::{derive_metrics, DerivedMetrics};
    pub use crate::pipeline::AnalysisPipeline;
    pub use crate::prompt::{build_prompt, ReplyFormatter};
}
