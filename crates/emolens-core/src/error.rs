//! Error types for EmoLens

/// Result type alias using EmoLens's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for EmoLens operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed input, or a prior record that does not exist
    #[error("{0}")]
    Validation(String),

    /// Comment or metadata source unavailable
    #[error("upstream fetch error: {0}")]
    UpstreamFetch(String),

    /// A classifier batch call failed; the whole classification is void
    #[error("classification error ({model}, batch {batch}): {detail}")]
    Classification {
        model: String,
        batch: usize,
        detail: String,
    },

    /// The narrative generation service failed
    #[error("narrative generation error: {0}")]
    NarrativeGeneration(String),

    /// Persistence store errors
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// A pipeline stage failed
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new upstream fetch error
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamFetch(msg.into())
    }

    /// Create a new classification error for a batch of `model`
    pub fn classification(model: impl Into<String>, batch: usize, detail: impl Into<String>) -> Self {
        Self::Classification {
            model: model.into(),
            batch,
            detail: detail.into(),
        }
    }

    /// Create a new narrative generation error
    pub fn narrative(msg: impl Into<String>) -> Self {
        Self::NarrativeGeneration(msg.into())
    }

    /// Create a new storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Tag this error with the pipeline stage it came from
    pub fn in_stage(self, stage: &'static str) -> Self {
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through stage tags
    pub fn root(&self) -> &Error {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Short, stable name of the error kind (used as a metrics label)
    pub fn kind(&self) -> &'static str {
        match self.root() {
            Self::Validation(_) => "validation",
            Self::UpstreamFetch(_) => "upstream_fetch",
            Self::Classification { .. } => "classification",
            Self::NarrativeGeneration(_) => "narrative_generation",
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) | Self::Stage { .. } => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_tag_keeps_root_kind() {
        let err = Error::classification("sentiment-model", 2, "503 Service Unavailable")
            .in_stage("classify_sentiment");

        assert_eq!(err.kind(), "classification");
        assert!(matches!(err.root(), Error::Classification { batch: 2, .. }));
        assert_eq!(
            err.to_string(),
            "classify_sentiment stage failed: classification error (sentiment-model, batch 2): 503 Service Unavailable"
        );
    }

    #[test]
    fn test_validation_message_is_bare() {
        let err = Error::validation("YouTube URL is required!!");
        assert_eq!(err.to_string(), "YouTube URL is required!!");
        assert_eq!(err.kind(), "validation");
    }
}
