//! Shared application state

use crate::config::{Secrets, ServerConfig};
use crate::service::VideoService;
use emolens_analysis::{
    ClassificationBackend, CommentSource, GroqClient, HuggingFaceBackend, MetadataSource,
    NarrativeGenerator, YouTubeClient,
};
use emolens_store::{open_store, AnalysisStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// State cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub service: Arc<VideoService>,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    /// Build the external clients and open the record store
    pub async fn new(
        config: ServerConfig,
        secrets: Secrets,
        metrics_handle: Option<PrometheusHandle>,
    ) -> anyhow::Result<Self> {
        let analysis = &config.analysis;
        let timeout = Duration::from_secs(analysis.request_timeout_secs);

        let youtube = Arc::new(YouTubeClient::new(
            analysis.youtube.clone(),
            secrets.youtube_api_key,
            timeout,
        )?);
        let backend: Arc<dyn ClassificationBackend> = Arc::new(HuggingFaceBackend::new(
            analysis.models.base_url.clone(),
            secrets.hf_token,
            timeout,
        )?);
        let generator: Arc<dyn NarrativeGenerator> = Arc::new(GroqClient::new(
            analysis.llm.clone(),
            secrets.groq_api_key,
            timeout,
        )?);

        let store = open_store(&config.store).await?;
        info!("Using {} record store", store.name());

        Self::from_parts(
            config,
            store,
            youtube.clone(),
            youtube,
            backend,
            generator,
            metrics_handle,
        )
    }

    /// Assemble state from already-built components
    pub fn from_parts(
        config: ServerConfig,
        store: Arc<dyn AnalysisStore>,
        comments: Arc<dyn CommentSource>,
        metadata: Arc<dyn MetadataSource>,
        backend: Arc<dyn ClassificationBackend>,
        generator: Arc<dyn NarrativeGenerator>,
        metrics_handle: Option<PrometheusHandle>,
    ) -> anyhow::Result<Self> {
        let service = VideoService::new(
            &config.analysis,
            store,
            comments,
            metadata,
            backend,
            generator,
        )?;

        Ok(Self {
            config: Arc::new(config),
            service: Arc::new(service),
            metrics_handle,
        })
    }
}
