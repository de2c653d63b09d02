//! Classification backend trait and common types

use async_trait::async_trait;
use emolens_core::Result;
use serde::{Deserialize, Serialize};

/// A hosted text-classification service
///
/// Implementations receive at most one batch worth of texts, each already
/// truncated, and must return one candidate list per input, in input order.
#[async_trait]
pub trait ClassificationBackend: Send + Sync {
    /// Classify a batch of texts with the given model
    async fn classify_batch(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<RawScore>>>;

    /// Get the backend name
    fn name(&self) -> &str;
}

/// A label as spelled by the model, with its confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawScore {
    pub label: String,
    pub score: f64,
}

impl RawScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}
