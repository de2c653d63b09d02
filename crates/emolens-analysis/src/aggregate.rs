//! Aggregation of per-comment labels into an analysis record

use crate::round_to;
use emolens_core::{
    AnalysisAggregate, Comment, Dominant, EmotionLabel, Error, Label, LabeledScore, Result,
    SentimentLabel, TopComment,
};

/// Reduces classifier outputs into counts, shares, and top comments
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    top_k: usize,
}

impl Aggregator {
    /// Representative comments kept per polarity by default
    pub const DEFAULT_TOP_K: usize = 5;

    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Aggregate index-aligned comments and labels
    ///
    /// All three slices must describe the same comments in the same order.
    pub fn aggregate(
        &self,
        comments: &[Comment],
        sentiments: &[LabeledScore<SentimentLabel>],
        emotions: &[LabeledScore<EmotionLabel>],
    ) -> Result<AnalysisAggregate> {
        if comments.len() != sentiments.len() || comments.len() != emotions.len() {
            return Err(Error::internal(format!(
                "misaligned classification results: {} comments, {} sentiments, {} emotions",
                comments.len(),
                sentiments.len(),
                emotions.len()
            )));
        }

        let total = comments.len() as u64;
        let mut aggregate = AnalysisAggregate::empty();
        aggregate.total_comments = total;

        let sentiment_counts = tally(sentiments.iter().map(|s| s.label));
        for label in SentimentLabel::ALL {
            let share = aggregate.sentiment.get_mut(*label);
            share.count = sentiment_counts[label.index()];
            share.percentage = percentage(share.count, total);
        }

        let emotion_counts = tally(emotions.iter().map(|e| e.label));
        for label in EmotionLabel::ALL {
            let share = aggregate.emotion.get_mut(*label);
            share.count = emotion_counts[label.index()];
            share.percentage = percentage(share.count, total);
        }

        aggregate.dominant_sentiment = dominant(&sentiment_counts);
        aggregate.dominant_emotion = dominant(&emotion_counts);

        aggregate.top_positive_comments =
            self.top_comments(SentimentLabel::Positive, comments, sentiments, emotions);
        aggregate.top_negative_comments =
            self.top_comments(SentimentLabel::Negative, comments, sentiments, emotions);

        Ok(aggregate)
    }

    /// Comments with `polarity`, by descending emotion confidence
    fn top_comments(
        &self,
        polarity: SentimentLabel,
        comments: &[Comment],
        sentiments: &[LabeledScore<SentimentLabel>],
        emotions: &[LabeledScore<EmotionLabel>],
    ) -> Vec<TopComment> {
        let mut indices: Vec<usize> = (0..comments.len())
            .filter(|&i| sentiments[i].label == polarity)
            .collect();

        // Stable sort: equal scores keep comment order
        indices.sort_by(|&a, &b| emotions[b].score.total_cmp(&emotions[a].score));

        indices
            .into_iter()
            .take(self.top_k)
            .map(|i| TopComment {
                text: comments[i].text.clone(),
                emotion: emotions[i],
            })
            .collect()
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TOP_K)
    }
}

/// Count per label, indexed by declaration order
fn tally<L: Label>(labels: impl Iterator<Item = L>) -> Vec<u64> {
    let mut counts = vec![0u64; L::ALL.len()];
    for label in labels {
        counts[label.index()] += 1;
    }
    counts
}

/// Argmax over counts; ties go to the first-declared label
fn dominant<L: Label>(counts: &[u64]) -> Option<Dominant<L>> {
    let mut best: Option<Dominant<L>> = None;
    for label in L::ALL {
        let count = counts[label.index()];
        if count == 0 {
            continue;
        }
        match best {
            Some(current) if current.count >= count => {}
            _ => {
                best = Some(Dominant {
                    label: *label,
                    count,
                })
            }
        }
    }
    best
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(100.0 * count as f64 / total as f64, 2)
}
