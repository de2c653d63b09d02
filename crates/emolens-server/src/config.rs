//! Server configuration
//!
//! Layered, later wins: built-in defaults, the optional YAML file,
//! `EMOLENS__`-prefixed environment variables (`EMOLENS__ANALYSIS__TOP_K=3`),
//! then command-line flags. API keys are only read from flags or their
//! environment variables, never from the file.

use clap::Parser;
use emolens_analysis::AnalysisConfig;
use emolens_store::{StoreConfig, StoreKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "emolens-server")]
#[command(about = "EmoLens YouTube comment analysis API", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    pub config: String,

    /// Listen address
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "PORT")]
    pub port: Option<u16>,

    /// Record store backend (memory or jsonl)
    #[arg(long, value_parser = parse_store_kind)]
    pub store: Option<StoreKind>,

    /// Directory for the jsonl store
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Allowed CORS origin (repeatable)
    #[arg(long = "cors-origin")]
    pub cors_origins: Vec<String>,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub youtube_api_key: Option<String>,

    /// Hugging Face Inference API token
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    pub hf_token: Option<String>,

    /// Groq API key
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub groq_api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_store_kind(raw: &str) -> Result<StoreKind, String> {
    match raw.to_ascii_lowercase().as_str() {
        "memory" => Ok(StoreKind::Memory),
        "jsonl" => Ok(StoreKind::Jsonl),
        other => Err(format!("unknown store '{other}', expected memory or jsonl")),
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed to call the API from a browser
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl ServerConfig {
    /// Load configuration from file and environment, then apply CLI overrides
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&cli.config).required(false))
            .add_source(
                config::Environment::with_prefix("EMOLENS")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Self = settings.try_deserialize()?;
        config.apply_cli(cli);
        config.analysis.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(listen) = &cli.listen {
            self.listen = listen.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(kind) = cli.store {
            self.store.kind = kind;
        }
        if let Some(dir) = &cli.data_dir {
            self.store.dir = dir.clone();
        }
        if !cli.cors_origins.is_empty() {
            self.cors_origins = cli.cors_origins.clone();
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listen, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            store: StoreConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

/// Credentials for the external services
#[derive(Clone, Default)]
pub struct Secrets {
    pub youtube_api_key: Option<String>,
    pub hf_token: Option<String>,
    pub groq_api_key: Option<String>,
}

impl Secrets {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            youtube_api_key: non_empty(&cli.youtube_api_key),
            hf_token: non_empty(&cli.hf_token),
            groq_api_key: non_empty(&cli.groq_api_key),
        }
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("Secrets")
            .field("youtube_api_key", &redact(&self.youtube_api_key))
            .field("hf_token", &redact(&self.hf_token))
            .field("groq_api_key", &redact(&self.groq_api_key))
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_yaml_file_and_cli_overrides() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "port: 9000\nstore:\n  kind: jsonl\n  dir: /var/lib/emolens\nanalysis:\n  top_k: 3\n  gateway:\n    batch_size: 8"
        )
        .unwrap();

        let cli = Cli::parse_from([
            "emolens-server",
            "--config",
            file.path().to_str().unwrap(),
            "--port",
            "9100",
            "--cors-origin",
            "https://app.example.com",
        ]);
        let config = ServerConfig::load(&cli).unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.listen, "0.0.0.0");
        assert_eq!(config.store.kind, StoreKind::Jsonl);
        assert_eq!(config.store.dir, PathBuf::from("/var/lib/emolens"));
        assert_eq!(config.analysis.top_k, 3);
        assert_eq!(config.analysis.gateway.batch_size, 8);
        assert_eq!(config.analysis.gateway.max_chars, 1800);
        assert_eq!(config.cors_origins, vec!["https://app.example.com"]);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let cli = Cli::parse_from(["emolens-server", "--config", "/nonexistent/emolens.yaml"]);
        let config = ServerConfig::load(&cli).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.store.kind, StoreKind::Memory);
        assert_eq!(config.analysis.gateway.batch_size, 32);
    }

    #[test]
    fn test_invalid_analysis_config_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "analysis:\n  gateway:\n    batch_size: 0").unwrap();

        let cli = Cli::parse_from(["emolens-server", "--config", file.path().to_str().unwrap()]);
        assert!(ServerConfig::load(&cli).is_err());
    }

    #[test]
    fn test_store_flag_parsing() {
        let cli = Cli::parse_from(["emolens-server", "--store", "JSONL", "--data-dir", "/tmp/x"]);
        let mut config = ServerConfig::default();
        config.apply_cli(&cli);

        assert_eq!(config.store.kind, StoreKind::Jsonl);
        assert_eq!(config.store.dir, PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_secrets_debug_is_redacted() {
        let secrets = Secrets {
            youtube_api_key: Some("AIza-secret".to_string()),
            ..Secrets::default()
        };
        let rendered = format!("{secrets:?}");
        assert!(!rendered.contains("AIza-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
