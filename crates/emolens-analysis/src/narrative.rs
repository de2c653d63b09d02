//! Narrative summary generation
//!
//! The LLM is treated as an opaque text generator: the prompt goes in, free
//! text comes back, and [`ReplyFormatter`] flattens it for display.

use crate::config::LlmConfig;
use crate::prompt::{build_prompt, ReplyFormatter};
use async_trait::async_trait;
use emolens_core::{AnalysisAggregate, Error, Result, VideoMetadata};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Text generation service
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Generate free text for a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the generator name
    fn name(&self) -> &str;
}

/// Client for Groq's OpenAI-compatible chat completions endpoint
pub struct GroqClient {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: Option<String>,
}

impl GroqClient {
    pub fn new(config: LlmConfig, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build LLM client: {e}")))?;

        Ok(Self::with_client(client, config, api_key))
    }

    pub fn with_client(client: reqwest::Client, config: LlmConfig, api_key: Option<String>) -> Self {
        Self {
            client,
            config,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice
    fn into_text(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Error::narrative("LLM reply contained no text"))
    }
}

#[async_trait]
impl NarrativeGenerator for GroqClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::narrative("No LLM API key configured"))?;

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::narrative(format!("LLM request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::narrative(format!("LLM returned {status}: {body}")));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::narrative(format!("Failed to parse LLM reply: {e}")))?;

        reply.into_text()
    }

    fn name(&self) -> &str {
        "groq"
    }
}

/// Prompt, generate, and clean up a narrative summary
pub struct NarrativeSummarizer {
    generator: Arc<dyn NarrativeGenerator>,
    formatter: ReplyFormatter,
}

impl NarrativeSummarizer {
    pub fn new(generator: Arc<dyn NarrativeGenerator>) -> Result<Self> {
        Ok(Self {
            generator,
            formatter: ReplyFormatter::new()?,
        })
    }

    /// Summarize an aggregate; the result is formatted display text
    pub async fn summarize(
        &self,
        aggregate: &AnalysisAggregate,
        metadata: Option<&VideoMetadata>,
    ) -> Result<String> {
        let start = Instant::now();
        let prompt = build_prompt(aggregate, metadata);
        debug!("Narrative prompt is {} chars", prompt.len());

        let raw = self.generator.generate(&prompt).await?;
        let summary = self.formatter.format(&raw);

        info!(
            "Narrative generated by {} in {:?} ({} chars)",
            self.generator.name(),
            start.elapsed(),
            summary.len()
        );
        Ok(summary)
    }
}
