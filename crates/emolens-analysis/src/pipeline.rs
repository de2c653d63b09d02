//! Analysis pipeline
//!
//! One analysis is a fixed sequence of stages over a single video:
//!
//! ```text
//! fetch -> normalize -> classify sentiment -> classify emotion -> aggregate
//! ```
//!
//! Each stage runs to completion before the next starts. The first failure
//! aborts the run and is tagged with the stage it came from.

use crate::aggregate::Aggregator;
use crate::classifier::ClassificationBackend;
use crate::config::AnalysisConfig;
use crate::gateway::BatchClassifier;
use crate::normalize::TextNormalizer;
use crate::source::CommentSource;
use emolens_core::{AnalysisAggregate, Comment, EmotionLabel, Result, SentimentLabel};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// A step of the analysis pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Fetch,
    Normalize,
    ClassifySentiment,
    ClassifyEmotion,
    Aggregate,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Normalize => "normalize",
            Self::ClassifySentiment => "classify_sentiment",
            Self::ClassifyEmotion => "classify_emotion",
            Self::Aggregate => "aggregate",
        }
    }
}

/// Time spent in one stage
#[derive(Debug, Clone, Copy)]
pub struct StageTiming {
    pub stage: PipelineStage,
    pub latency_us: u64,
}

/// Complete pipeline execution result
#[derive(Debug, Clone)]
pub struct AnalysisExecution {
    /// The aggregate record, without a summary
    pub aggregate: AnalysisAggregate,

    /// Comments returned by the source, before cleaning
    pub comments_fetched: usize,

    /// Per-stage latencies in execution order
    pub stage_timings: Vec<StageTiming>,

    /// Total pipeline execution time
    pub total_latency_us: u64,
}

/// Fetch-to-aggregate analysis of a video's comments
pub struct AnalysisPipeline {
    source: Arc<dyn CommentSource>,
    normalizer: TextNormalizer,
    sentiment: BatchClassifier<SentimentLabel>,
    emotion: BatchClassifier<EmotionLabel>,
    aggregator: Aggregator,
}

impl AnalysisPipeline {
    pub fn new(
        source: Arc<dyn CommentSource>,
        normalizer: TextNormalizer,
        sentiment: BatchClassifier<SentimentLabel>,
        emotion: BatchClassifier<EmotionLabel>,
        aggregator: Aggregator,
    ) -> Self {
        Self {
            source,
            normalizer,
            sentiment,
            emotion,
            aggregator,
        }
    }

    /// Build the pipeline described by `config`, classifying through `backend`
    pub fn from_config(
        config: &AnalysisConfig,
        source: Arc<dyn CommentSource>,
        backend: Arc<dyn ClassificationBackend>,
    ) -> Result<Self> {
        config.validate()?;

        let sentiment = BatchClassifier::new(backend.clone(), &config.models.sentiment, config.gateway)
            .with_aliases(config.models.sentiment_aliases.clone());
        let emotion = BatchClassifier::new(backend, &config.models.emotion, config.gateway)
            .with_aliases(config.models.emotion_aliases.clone());

        Ok(Self::new(
            source,
            TextNormalizer::new()?,
            sentiment,
            emotion,
            Aggregator::new(config.top_k),
        ))
    }

    /// Analyze the comments of `video_id`
    pub async fn run(&self, video_id: &str) -> Result<AnalysisExecution> {
        let start = Instant::now();
        let mut timings = Vec::with_capacity(5);

        let stage_start = Instant::now();
        let comments = self
            .source
            .fetch_comments(video_id)
            .await
            .map_err(|e| e.in_stage(PipelineStage::Fetch.as_str()))?;
        record(&mut timings, PipelineStage::Fetch, stage_start);
        info!(
            "Fetched {} comments for {} from {}",
            comments.len(),
            video_id,
            self.source.name()
        );

        let comments_fetched = comments.len();
        let aggregate = self.analyze_comments(comments, &mut timings).await?;

        let total_latency_us = start.elapsed().as_micros() as u64;
        info!(
            "Analysis of {} finished: {} of {} comments classified in {}us",
            video_id, aggregate.total_comments, comments_fetched, total_latency_us
        );

        Ok(AnalysisExecution {
            aggregate,
            comments_fetched,
            stage_timings: timings,
            total_latency_us,
        })
    }

    /// Run every stage after fetching on already fetched comments
    pub async fn analyze_comments(
        &self,
        comments: Vec<Comment>,
        timings: &mut Vec<StageTiming>,
    ) -> Result<AnalysisAggregate> {
        let stage_start = Instant::now();
        let comments = self.normalizer.clean_comments(comments);
        let texts: Vec<String> = comments.iter().map(|c| c.text.clone()).collect();
        record(timings, PipelineStage::Normalize, stage_start);

        let stage_start = Instant::now();
        let sentiments = self
            .sentiment
            .classify(&texts)
            .await
            .map_err(|e| e.in_stage(PipelineStage::ClassifySentiment.as_str()))?;
        record(timings, PipelineStage::ClassifySentiment, stage_start);

        let stage_start = Instant::now();
        let emotions = self
            .emotion
            .classify(&texts)
            .await
            .map_err(|e| e.in_stage(PipelineStage::ClassifyEmotion.as_str()))?;
        record(timings, PipelineStage::ClassifyEmotion, stage_start);

        let stage_start = Instant::now();
        let aggregate = self
            .aggregator
            .aggregate(&comments, &sentiments, &emotions)
            .map_err(|e| e.in_stage(PipelineStage::Aggregate.as_str()))?;
        record(timings, PipelineStage::Aggregate, stage_start);

        Ok(aggregate)
    }
}

fn record(timings: &mut Vec<StageTiming>, stage: PipelineStage, start: Instant) {
    let latency_us = start.elapsed().as_micros() as u64;
    metrics::histogram!("emolens_stage_latency_us", "stage" => stage.as_str())
        .record(latency_us as f64);
    timings.push(StageTiming { stage, latency_us });
}
