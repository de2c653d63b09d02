//! Hugging Face Inference API backend
//!
//! Posts `{"inputs": [...], "parameters": {"top_k": null}}` to
//! `{base_url}/models/{model}`. A null `top_k` asks for every candidate label
//! per input, so the gateway can skip labels outside its label set. A flat
//! top-label-per-input reply is still accepted.

use crate::classifier::{ClassificationBackend, RawScore};
use async_trait::async_trait;
use emolens_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Text-classification backend on the Hugging Face Inference API
pub struct HuggingFaceBackend {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HuggingFaceBackend {
    /// Create a backend with its own HTTP client
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build Hugging Face client: {e}")))?;

        Ok(Self::with_client(client, base_url, token))
    }

    /// Create a backend sharing an existing HTTP client
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        if token.is_none() {
            warn!("No Hugging Face token configured, requests will be rate limited");
        }

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a [String],
    parameters: InferenceParameters,
}

impl<'a> InferenceRequest<'a> {
    fn all_candidates(inputs: &'a [String]) -> Self {
        Self {
            inputs,
            parameters: InferenceParameters { top_k: None },
        }
    }
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    /// `None` serializes as null: return every label
    top_k: Option<usize>,
}

/// Reply body of the text-classification task
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum InferenceReply {
    /// Every candidate label per input
    Nested(Vec<Vec<RawScore>>),
    /// Top label per input
    Flat(Vec<RawScore>),
}

impl InferenceReply {
    pub(crate) fn into_candidates(self) -> Vec<Vec<RawScore>> {
        match self {
            Self::Nested(candidates) => candidates,
            Self::Flat(top) => top.into_iter().map(|score| vec![score]).collect(),
        }
    }
}

#[async_trait]
impl ClassificationBackend for HuggingFaceBackend {
    async fn classify_batch(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<RawScore>>> {
        let url = format!("{}/models/{}", self.base_url, model);

        let mut request = self.client.post(&url).json(&InferenceRequest::all_candidates(inputs));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Hugging Face request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(format!("Hugging Face returned {status}: {body}")));
        }

        let reply: InferenceReply = response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("Failed to parse Hugging Face reply: {e}")))?;

        Ok(reply.into_candidates())
    }

    fn name(&self) -> &str {
        "huggingface"
    }
}
