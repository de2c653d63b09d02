//! Performance metrics derived from an analysis aggregate
//!
//! | metric | formula | range |
//! |---|---|---|
//! | satisfaction score | positive% - negative% | -100..=100 |
//! | net sentiment | (positive - negative) / total | -1..=1 |
//! | positive ratio | positive / max(negative, 1) | >= 0 |
//! | concentration | dominant emotion count / total | 0..=1 |
//! | negative risk index | (negative% / 100) * (anger% + disgust%) / 100 | 0..=1 |
//!
//! Every metric is 0 for an aggregate with no comments.

use crate::round_to;
use emolens_core::AnalysisAggregate;
use serde::{Deserialize, Serialize};

/// Scalar performance metrics, recomputed on demand
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub satisfaction_score: f64,
    pub net_sentiment_score: f64,
    pub positive_ratio: f64,
    pub concentration: f64,
    pub negative_risk_index: f64,
}

/// Compute the metrics for `aggregate`
pub fn derive_metrics(aggregate: &AnalysisAggregate) -> DerivedMetrics {
    let total = aggregate.total_comments;
    if total == 0 {
        return DerivedMetrics::default();
    }

    let total = total as f64;
    let positive = aggregate.sentiment.positive;
    let negative = aggregate.sentiment.negative;
    let dominant_emotion_count = aggregate.dominant_emotion.map_or(0, |d| d.count) as f64;
    let hostile_pct = aggregate.emotion.anger.percentage + aggregate.emotion.disgust.percentage;

    DerivedMetrics {
        satisfaction_score: round_to(positive.percentage - negative.percentage, 1),
        net_sentiment_score: round_to(
            (positive.count as f64 - negative.count as f64) / total,
            2,
        ),
        positive_ratio: round_to(positive.count as f64 / negative.count.max(1) as f64, 2),
        concentration: round_to(dominant_emotion_count / total, 2),
        negative_risk_index: round_to(
            (negative.percentage / 100.0) * (hostile_pct / 100.0),
            3,
        ),
    }
}

/// Severity band of the negative risk index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

/// Metrics rescaled to 0-100 for side-by-side display
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMetrics {
    pub satisfaction: f64,
    pub net_sentiment: f64,
    pub positive_ratio: f64,
    pub concentration: f64,
    pub negative_risk_index: f64,
}

/// Positive ratios above this are shown as full scale
const POSITIVE_RATIO_CAP: f64 = 10.0;

impl DerivedMetrics {
    pub fn risk_band(&self) -> RiskBand {
        if self.negative_risk_index < 0.3 {
            RiskBand::Low
        } else if self.negative_risk_index < 0.6 {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }

    pub fn normalized(&self) -> NormalizedMetrics {
        NormalizedMetrics {
            satisfaction: round_to((self.satisfaction_score + 100.0) / 2.0, 1),
            net_sentiment: round_to((self.net_sentiment_score + 1.0) / 2.0 * 100.0, 1),
            positive_ratio: round_to(
                self.positive_ratio.min(POSITIVE_RATIO_CAP) / POSITIVE_RATIO_CAP * 100.0,
                1,
            ),
            concentration: round_to(self.concentration * 100.0, 1),
            negative_risk_index: round_to(self.negative_risk_index * 100.0, 1),
        }
    }
}
