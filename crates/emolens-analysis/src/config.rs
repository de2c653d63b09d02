//! Configuration for the analysis pipeline and its external services

use emolens_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for the whole analysis pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Classification models
    #[serde(default)]
    pub models: ModelsConfig,

    /// Batching limits for classifier calls
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Number of representative comments kept per polarity
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// YouTube Data API settings
    #[serde(default)]
    pub youtube: YouTubeConfig,

    /// Narrative generation settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Timeout applied to every outbound HTTP call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl AnalysisConfig {
    /// Reject values that would make the pipeline misbehave
    pub fn validate(&self) -> Result<()> {
        self.gateway.validate()?;

        if self.top_k == 0 {
            return Err(Error::config("top_k must be at least 1"));
        }
        if self.youtube.max_comments == 0 {
            return Err(Error::config("youtube.max_comments must be at least 1"));
        }
        if self.models.sentiment.trim().is_empty() || self.models.emotion.trim().is_empty() {
            return Err(Error::config("both sentiment and emotion model ids are required"));
        }

        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            models: ModelsConfig::default(),
            gateway: GatewayConfig::default(),
            top_k: default_top_k(),
            youtube: YouTubeConfig::default(),
            llm: LlmConfig::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Hosted classification models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Inference API base URL
    #[serde(default = "default_inference_url")]
    pub base_url: String,

    /// Sentiment model id (positive / neutral / negative)
    #[serde(default = "default_sentiment_model")]
    pub sentiment: String,

    /// Emotion model id (joy / anger / sadness / fear / surprise / disgust)
    #[serde(default = "default_emotion_model")]
    pub emotion: String,

    /// Model label spelling -> canonical sentiment label (e.g. LABEL_2 -> positive)
    #[serde(default)]
    pub sentiment_aliases: HashMap<String, String>,

    /// Model label spelling -> canonical emotion label
    #[serde(default)]
    pub emotion_aliases: HashMap<String, String>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            base_url: default_inference_url(),
            sentiment: default_sentiment_model(),
            emotion: default_emotion_model(),
            sentiment_aliases: HashMap::new(),
            emotion_aliases: HashMap::new(),
        }
    }
}

/// Batching limits for the classifier gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Texts per upstream call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Characters kept per text (models accept about 512 tokens)
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl GatewayConfig {
    pub fn new(batch_size: usize, max_chars: usize) -> Self {
        Self {
            batch_size,
            max_chars,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::config("gateway.batch_size must be at least 1"));
        }
        if self.max_chars == 0 {
            return Err(Error::config("gateway.max_chars must be at least 1"));
        }
        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_chars: default_max_chars(),
        }
    }
}

/// YouTube Data API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    #[serde(default = "default_youtube_url")]
    pub base_url: String,

    /// Upper bound on comments fetched per analysis
    #[serde(default = "default_max_comments")]
    pub max_comments: usize,

    /// Comments requested per page (the API caps this at 100)
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            base_url: default_youtube_url(),
            max_comments: default_max_comments(),
            page_size: default_page_size(),
        }
    }
}

/// Narrative generation settings (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_url(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_inference_url() -> String {
    "https://router.huggingface.co/hf-inference".to_string()
}

fn default_sentiment_model() -> String {
    "cardiffnlp/twitter-roberta-base-sentiment-latest".to_string()
}

fn default_emotion_model() -> String {
    "j-hartmann/emotion-english-distilroberta-base".to_string()
}

fn default_batch_size() -> usize {
    32
}

fn default_max_chars() -> usize {
    1800
}

fn default_youtube_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_max_comments() -> usize {
    500
}

fn default_page_size() -> usize {
    100
}

fn default_llm_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1500
}

fn default_system_prompt() -> String {
    "You are a professional YouTube audience intelligence analyst.".to_string()
}
