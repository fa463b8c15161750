//! Configuration loading and types.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::twitter::DEFAULT_API_BASE_URL;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub twitter: TwitterConfig,

    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TwitterConfig {
    /// Base URL of the upstream API. Overridden in tests to point at a mock.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Bearer secret for guest session activation, without the `Bearer `
    /// prefix. Falls back to the TWITTER_BEARER_TOKEN environment variable.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            bearer_token: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Explicit ffmpeg path; discovered on PATH when unset.
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./talon.toml",
        "~/.config/talon/config.toml",
        "/etc/talon/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env(&mut config);
    Ok(config)
}

fn apply_env(config: &mut Config) {
    if config.twitter.bearer_token.is_none() {
        config.twitter.bearer_token = std::env::var("TWITTER_BEARER_TOKEN")
            .ok()
            .filter(|v| !v.is_empty());
    }
}

/// Validate configuration.
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if !config.twitter.api_base_url.starts_with("http://")
        && !config.twitter.api_base_url.starts_with("https://")
    {
        anyhow::bail!(
            "twitter.api_base_url must be an http(s) URL, got: {}",
            config.twitter.api_base_url
        );
    }

    if let Some(path) = &config.download.ffmpeg_path {
        if !path.exists() {
            tracing::warn!("Configured ffmpeg path does not exist: {:?}", path);
        }
    }

    Ok(())
}
