//! Batch classifier gateway
//!
//! Sends texts to a hosted classifier in fixed-size batches, one call per
//! batch, strictly in sequence. A failed batch fails the whole call: there are
//! no retries, no caching, and no partial results.

use crate::classifier::{ClassificationBackend, RawScore};
use crate::config::GatewayConfig;
use emolens_core::{Error, Label, LabeledScore, Result};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Classifier bound to one model and one label set
pub struct BatchClassifier<L> {
    backend: Arc<dyn ClassificationBackend>,
    model: String,
    config: GatewayConfig,
    aliases: HashMap<String, String>,
    _label: PhantomData<L>,
}

impl<L: Label> BatchClassifier<L> {
    /// Create a classifier for `model` on the given backend
    pub fn new(
        backend: Arc<dyn ClassificationBackend>,
        model: impl Into<String>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            backend,
            model: model.into(),
            config,
            aliases: HashMap::new(),
            _label: PhantomData,
        }
    }

    /// Map model-specific label spellings onto canonical labels
    ///
    /// Alias keys match case-insensitively.
    pub fn with_aliases(mut self, aliases: HashMap<String, String>) -> Self {
        self.aliases = aliases
            .into_iter()
            .map(|(spelled, canonical)| (spelled.to_lowercase(), canonical))
            .collect();
        self
    }

    /// Get the model id
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the batching limits
    pub fn config(&self) -> GatewayConfig {
        self.config
    }

    /// Classify every text; output has the same length and order as input
    pub async fn classify(&self, texts: &[String]) -> Result<Vec<LabeledScore<L>>> {
        let batch_size = self.config.batch_size.max(1);
        let mut results = Vec::with_capacity(texts.len());

        for (batch, chunk) in texts.chunks(batch_size).enumerate() {
            let start = Instant::now();
            let inputs: Vec<String> = chunk
                .iter()
                .map(|text| truncate(text, self.config.max_chars))
                .collect();

            let replies = self
                .backend
                .classify_batch(&self.model, &inputs)
                .await
                .map_err(|e| self.batch_error(batch, e))?;

            if replies.len() != inputs.len() {
                return Err(Error::classification(
                    &self.model,
                    batch,
                    format!("expected {} results, got {}", inputs.len(), replies.len()),
                ));
            }

            for (offset, candidates) in replies.iter().enumerate() {
                let resolved = self.resolve(candidates).ok_or_else(|| {
                    Error::classification(
                        &self.model,
                        batch,
                        format!(
                            "no recognizable {} label for input {}",
                            L::AXIS,
                            batch * batch_size + offset
                        ),
                    )
                })?;
                results.push(resolved);
            }

            metrics::counter!("emolens_classifier_batches_total", "model" => self.model.clone())
                .increment(1);
            debug!(
                "{} batch {} ({} texts) classified by {} in {:?}",
                L::AXIS,
                batch,
                inputs.len(),
                self.backend.name(),
                start.elapsed()
            );
        }

        Ok(results)
    }

    /// Highest-scoring candidate whose label belongs to the label set
    ///
    /// Labels outside the set (the emotion model's `neutral`) are dropped, so a
    /// comment whose top label is `neutral` takes its best in-set label with
    /// that label's own score.
    fn resolve(&self, candidates: &[RawScore]) -> Option<LabeledScore<L>> {
        candidates
            .iter()
            .filter_map(|candidate| {
                let spelled = self
                    .aliases
                    .get(&candidate.label.to_lowercase())
                    .map(String::as_str)
                    .unwrap_or(&candidate.label);
                L::parse(spelled).map(|label| LabeledScore::new(label, candidate.score))
            })
            .fold(None, |best: Option<LabeledScore<L>>, current| match best {
                Some(best) if best.score >= current.score => Some(best),
                _ => Some(current),
            })
    }

    fn batch_error(&self, batch: usize, error: Error) -> Error {
        let detail = match error {
            Error::Classification { detail, .. } => detail,
            other => other.to_string(),
        };
        Error::classification(&self.model, batch, detail)
    }
}

/// Keep at most `max_chars` characters
fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use emolens_core::{EmotionLabel, SentimentLabel};
    use std::sync::Mutex;

    /// Echo backend: labels each text with its first word
    struct EchoBackend {
        batches: Mutex<Vec<Vec<String>>>,
        fail_on_batch: Option<usize>,
    }

    impl EchoBackend {
        fn new() -> Self {
            Self {
                batches: Mutex::new(Vec::new()),
                fail_on_batch: None,
            }
        }
    }

    #[async_trait]
    impl ClassificationBackend for EchoBackend {
        async fn classify_batch(&self, _model: &str, inputs: &[String]) -> Result<Vec<Vec<RawScore>>> {
            let mut batches = self.batches.lock().unwrap();
            if Some(batches.len()) == self.fail_on_batch {
                return Err(Error::upstream("503 Service Unavailable"));
            }
            batches.push(inputs.to_vec());

            Ok(inputs
                .iter()
                .map(|text| vec![RawScore::new(text.split(' ').next().unwrap_or(""), 0.9)])
                .collect())
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn texts(labels: &[&str]) -> Vec<String> {
        labels
            .iter()
            .enumerate()
            .map(|(i, label)| format!("{label} comment {i}"))
            .collect()
    }

    #[tokio::test]
    async fn test_seventy_texts_make_three_calls_in_order() {
        let backend = Arc::new(EchoBackend::new());
        let classifier: BatchClassifier<SentimentLabel> =
            BatchClassifier::new(backend.clone(), "sentiment", GatewayConfig::new(32, 1800));

        let labels: Vec<&str> = (0..70)
            .map(|i| ["positive", "neutral", "negative"][i % 3])
            .collect();
        let result = classifier.classify(&texts(&labels)).await.unwrap();

        let batches = backend.batches.lock().unwrap();
        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![32, 32, 6]);

        assert_eq!(result.len(), 70);
        for (i, scored) in result.iter().enumerate() {
            assert_eq!(scored.label.as_str(), labels[i]);
        }
        assert_eq!(batches[2][5], "positive comment 69");
    }

    #[tokio::test]
    async fn test_texts_are_truncated_to_char_cap() {
        let backend = Arc::new(EchoBackend::new());
        let classifier: BatchClassifier<EmotionLabel> =
            BatchClassifier::new(backend.clone(), "emotion", GatewayConfig::new(4, 5));

        classifier
            .classify(&["joy ééééééé".to_string()])
            .await
            .unwrap();

        let batches = backend.batches.lock().unwrap();
        assert_eq!(batches[0][0], "joy é");
    }

    #[tokio::test]
    async fn test_failed_batch_fails_whole_call() {
        let backend = Arc::new(EchoBackend {
            batches: Mutex::new(Vec::new()),
            fail_on_batch: Some(1),
        });
        let classifier: BatchClassifier<SentimentLabel> =
            BatchClassifier::new(backend, "sentiment-model", GatewayConfig::new(2, 100));

        let err = classifier
            .classify(&texts(&["positive", "neutral", "negative"]))
            .await
            .unwrap_err();

        match err {
            Error::Classification { model, batch, detail } => {
                assert_eq!(model, "sentiment-model");
                assert_eq!(batch, 1);
                assert!(detail.contains("503"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_label_is_an_error() {
        let backend = Arc::new(EchoBackend::new());
        let classifier: BatchClassifier<EmotionLabel> =
            BatchClassifier::new(backend, "emotion", GatewayConfig::default());

        let err = classifier
            .classify(&texts(&["love"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Classification { batch: 0, .. }));
    }

    #[tokio::test]
    async fn test_aliases_map_model_labels() {
        let backend = Arc::new(EchoBackend::new());
        let aliases = HashMap::from([("LABEL_2".to_string(), "positive".to_string())]);
        let classifier: BatchClassifier<SentimentLabel> =
            BatchClassifier::new(backend, "sentiment", GatewayConfig::default())
                .with_aliases(aliases);

        let result = classifier.classify(&texts(&["LABEL_2"])).await.unwrap();
        assert_eq!(result[0].label, SentimentLabel::Positive);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let backend = Arc::new(EchoBackend::new());
        let classifier: BatchClassifier<SentimentLabel> =
            BatchClassifier::new(backend.clone(), "sentiment", GatewayConfig::default());

        assert!(classifier.classify(&[]).await.unwrap().is_empty());
        assert!(backend.batches.lock().unwrap().is_empty());
    }

    /// Replays a captured multi-label reply for every batch
    struct ReplayBackend {
        body: &'static str,
    }

    #[async_trait]
    impl ClassificationBackend for ReplayBackend {
        async fn classify_batch(&self, _model: &str, _inputs: &[String]) -> Result<Vec<Vec<RawScore>>> {
            let reply: crate::huggingface::InferenceReply = serde_json::from_str(self.body)?;
            Ok(reply.into_candidates())
        }

        fn name(&self) -> &str {
            "replay"
        }
    }

    #[tokio::test]
    async fn test_neutral_top_label_falls_back_to_best_emotion() {
        let backend = Arc::new(ReplayBackend {
            body: r#"[[
                {"label": "neutral", "score": 0.86},
                {"label": "surprise", "score": 0.06},
                {"label": "joy", "score": 0.04},
                {"label": "sadness", "score": 0.02},
                {"label": "anger", "score": 0.01},
                {"label": "fear", "score": 0.005},
                {"label": "disgust", "score": 0.005}
            ]]"#,
        });
        let classifier: BatchClassifier<EmotionLabel> =
            BatchClassifier::new(backend, "emotion", GatewayConfig::default());

        let result = classifier.classify(&["it is a video".to_string()]).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].label, EmotionLabel::Surprise);
        assert_eq!(result[0].score, 0.06);
    }

    #[test]
    fn test_resolve_picks_best_recognized_candidate() {
        let backend = Arc::new(EchoBackend::new());
        let classifier: BatchClassifier<EmotionLabel> =
            BatchClassifier::new(backend, "emotion", GatewayConfig::default());

        let candidates = vec![
            RawScore::new("neutral", 0.7),
            RawScore::new("anger", 0.2),
            RawScore::new("disgust", 0.2),
            RawScore::new("joy", 0.1),
        ];
        let resolved = classifier.resolve(&candidates).unwrap();
        assert_eq!(resolved.label, EmotionLabel::Anger);
        assert_eq!(resolved.score, 0.2);
    }
}
