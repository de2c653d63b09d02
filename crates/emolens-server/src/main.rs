//! EmoLens Server
//!
//! Serves the YouTube comment analysis API.

use anyhow::Result;
use clap::Parser;
use emolens_server::{create_router, AppState, Cli, Secrets, ServerConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("Starting EmoLens server");

    let config = ServerConfig::load(&cli)?;
    let secrets = Secrets::from_cli(&cli);
    info!("Configuration loaded successfully");
    info!("Sentiment model: {}", config.analysis.models.sentiment);
    info!("Emotion model: {}", config.analysis.models.emotion);
    info!("LLM model: {}", config.analysis.llm.model);
    info!("Store: {:?} ({:?})", config.store.kind, config.store.dir);
    info!("Credentials: {:?}", secrets);

    let metrics_handle = init_metrics()?;

    let addr: SocketAddr = config.bind_address().parse()?;
    let state = AppState::new(config, secrets, Some(metrics_handle)).await?;
    info!("Application state initialized successfully");

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("emolens=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("emolens=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Install the Prometheus recorder and describe the exported metrics
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "emolens_requests_total",
        "Total number of API requests by route"
    );
    metrics::describe_counter!(
        "emolens_analyses_total",
        "Total number of completed comment analyses"
    );
    metrics::describe_counter!("emolens_errors_total", "Total number of failed requests by kind");
    metrics::describe_histogram!(
        "emolens_stage_latency_us",
        metrics::Unit::Microseconds,
        "Analysis stage latency in microseconds by stage"
    );
    metrics::describe_counter!(
        "emolens_classifier_batches_total",
        "Total number of classification batches sent by model"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
