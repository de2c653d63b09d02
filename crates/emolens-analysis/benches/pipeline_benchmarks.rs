//! Benchmarks for the CPU-bound analysis stages
//!
//! Classification is remote, so only cleaning, aggregation, metrics, and reply
//! formatting are measured here; the classifier backend is an in-process stub.
//!
//! Run with: cargo bench -p emolens-analysis

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use emolens_analysis::{
    derive_metrics, AnalysisConfig, AnalysisPipeline, Aggregator, ClassificationBackend,
    CommentSource, RawScore, ReplyFormatter, TextNormalizer,
};
use emolens_core::{Comment, EmotionLabel, Label, LabeledScore, Result, SentimentLabel};
use std::sync::Arc;
use tokio::runtime::Runtime;

const SAMPLE_COMMENTS: &[&str] = &[
    "This is <b>amazing</b>!! 😀 https://youtu.be/dQw4w9WgXcQ",
    "bhai ये वीडियो बहुत अच्छा है 🔥🔥",
    "The audio at 3:14 is terrible, please fix it next time.",
    "first",
    "I've watched this three times and still learn something new every time.",
];

fn comments(n: usize) -> Vec<Comment> {
    (0..n)
        .map(|i| Comment::new(SAMPLE_COMMENTS[i % SAMPLE_COMMENTS.len()]))
        .collect()
}

struct StubSource {
    comments: Vec<Comment>,
}

#[async_trait]
impl CommentSource for StubSource {
    async fn fetch_comments(&self, _video_id: &str) -> Result<Vec<Comment>> {
        Ok(self.comments.clone())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

struct StubBackend;

#[async_trait]
impl ClassificationBackend for StubBackend {
    async fn classify_batch(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<RawScore>>> {
        let labels: &[&str] = if model.contains("sentiment") {
            &["positive", "neutral", "negative"]
        } else {
            &["joy", "anger", "sadness", "fear", "surprise", "disgust"]
        };

        Ok(inputs
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let label = labels[(text.len() + i) % labels.len()];
                vec![RawScore::new(label, 0.5 + (i % 50) as f64 / 100.0)]
            })
            .collect())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

fn benchmark_normalizer(c: &mut Criterion) {
    let normalizer = TextNormalizer::new().expect("Failed to create normalizer");

    let mut group = c.benchmark_group("Text_Normalizer");
    for (i, text) in SAMPLE_COMMENTS.iter().enumerate() {
        group.bench_with_input(BenchmarkId::new("normalize", i), text, |b, text| {
            b.iter(|| normalizer.normalize(black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_aggregator(c: &mut Criterion) {
    let mut group = c.benchmark_group("Aggregator");

    for size in [100usize, 500, 2000] {
        let input = comments(size);
        let sentiments: Vec<_> = (0..size)
            .map(|i| LabeledScore::new(SentimentLabel::ALL[i % 3], 0.9))
            .collect();
        let emotions: Vec<_> = (0..size)
            .map(|i| LabeledScore::new(EmotionLabel::ALL[i % 6], (i % 97) as f64 / 97.0))
            .collect();
        let aggregator = Aggregator::default();

        group.bench_with_input(BenchmarkId::new("aggregate", size), &size, |b, _| {
            b.iter(|| {
                let aggregate = aggregator
                    .aggregate(black_box(&input), &sentiments, &emotions)
                    .unwrap();
                derive_metrics(&aggregate)
            })
        });
    }

    group.finish();
}

fn benchmark_pipeline(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let pipeline = AnalysisPipeline::from_config(
        &AnalysisConfig::default(),
        Arc::new(StubSource {
            comments: comments(500),
        }),
        Arc::new(StubBackend),
    )
    .expect("Failed to build pipeline");

    c.bench_function("pipeline_run_500_comments", |b| {
        b.iter(|| rt.block_on(async { pipeline.run(black_box("dQw4w9WgXcQ")).await.unwrap() }))
    });
}

fn benchmark_reply_formatter(c: &mut Criterion) {
    let formatter = ReplyFormatter::new().expect("Failed to create formatter");
    let reply = "## 1. Overall audience reaction\n\n\
                 The audience is **overwhelmingly positive**, with *joy* dominating.\n\n\
                 ---\n\n\
                 ### 2. Key concerns\n\
                 - Audio quality in the `intro`\n\
                 - Pacing after the midpoint\n\
                 * Thumbnail feels __misleading__\n\n\n\n\
                 1.   Add chapters\n\
                 2.   Pin a correction comment\n";

    c.bench_function("reply_format", |b| b.iter(|| formatter.format(black_box(reply))));
}

criterion_group!(
    benches,
    benchmark_normalizer,
    benchmark_aggregator,
    benchmark_pipeline,
    benchmark_reply_formatter
);
criterion_main!(benches);
