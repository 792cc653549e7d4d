//! Configuration management for Stargazer
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, StargazerError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Stargazer
///
/// Holds the generative-text provider settings, the chat assistant
/// persona, and the APOD proxy settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Chat assistant configuration
    #[serde(default)]
    pub chat: ChatConfig,
    /// APOD proxy configuration
    #[serde(default)]
    pub proxy: ProxyConfig,
}

/// Provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Google Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Google Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model identifier sent with every request
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL (overridable so tests can point at a mock server)
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,

    /// Optional request timeout in seconds
    ///
    /// When unset, requests wait until the server answers or the
    /// connection drops.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            api_base: default_gemini_api_base(),
            timeout_seconds: None,
        }
    }
}

/// Chat assistant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// System instruction sent with every chat request
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,

    /// Synthetic greeting that opens every conversation
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

fn default_system_instruction() -> String {
    "You are Stargazer, a friendly and knowledgeable astronomy assistant. \
     Answer questions about stars, planets, constellations, galaxies, space missions \
     and observing the night sky. Keep answers accurate and approachable, and say so \
     when you are unsure."
        .to_string()
}

fn default_greeting() -> String {
    "Hello! I'm Stargazer, your astronomy assistant. Ask me about planets, stars, \
     galaxies, or what might be overhead tonight."
        .to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_instruction: default_system_instruction(),
            greeting: default_greeting(),
        }
    }
}

/// APOD proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Socket address the proxy listens on
    #[serde(default = "default_proxy_bind")]
    pub bind: String,

    /// Upstream Astronomy Picture of the Day endpoint
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Server-held APOD API key
    ///
    /// Normally supplied through `NASA_API_KEY`; never serialized back out.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Upstream request timeout in seconds
    #[serde(default = "default_proxy_timeout")]
    pub timeout_seconds: u64,
}

fn default_proxy_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_upstream_url() -> String {
    "https://api.nasa.gov/planetary/apod".to_string()
}

fn default_proxy_timeout() -> u64 {
    30
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind: default_proxy_bind(),
            upstream_url: default_upstream_url(),
            api_key: None,
            timeout_seconds: default_proxy_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from file, environment, and CLI
    ///
    /// A missing file is not an error; defaults are used instead.
    /// Environment variables override file values, and CLI arguments
    /// override both.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed command-line arguments
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| StargazerError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| StargazerError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(model) = std::env::var("STARGAZER_GEMINI_MODEL") {
            self.provider.gemini.model = model;
        }

        if let Ok(api_base) = std::env::var("STARGAZER_GEMINI_API_BASE") {
            self.provider.gemini.api_base = api_base;
        }

        if let Ok(timeout) = std::env::var("STARGAZER_GEMINI_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.provider.gemini.timeout_seconds = Some(value);
            } else {
                tracing::warn!("Invalid STARGAZER_GEMINI_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(bind) = std::env::var("STARGAZER_PROXY_BIND") {
            tracing::debug!(bind = %bind, "Env override: STARGAZER_PROXY_BIND");
            self.proxy.bind = bind;
        }

        if let Ok(upstream) = std::env::var("STARGAZER_APOD_URL") {
            tracing::debug!(upstream = %upstream, "Env override: STARGAZER_APOD_URL");
            self.proxy.upstream_url = upstream;
        }

        if let Ok(key) = std::env::var("NASA_API_KEY") {
            if !key.trim().is_empty() {
                self.proxy.api_key = Some(key);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        match &cli.command {
            crate::cli::Commands::Chat { model: Some(model) }
            | crate::cli::Commands::Zenith {
                model: Some(model), ..
            } => {
                tracing::debug!("CLI override: model={}", model);
                self.provider.gemini.model = model.clone();
            }
            crate::cli::Commands::Serve { bind: Some(bind) } => {
                tracing::debug!("CLI override: bind={}", bind);
                self.proxy.bind = bind.clone();
            }
            _ => {}
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `StargazerError::Config` describing the first invalid field
    pub fn validate(&self) -> Result<()> {
        if self.provider.gemini.model.trim().is_empty() {
            return Err(
                StargazerError::Config("provider.gemini.model cannot be empty".to_string()).into(),
            );
        }

        if url::Url::parse(&self.provider.gemini.api_base).is_err() {
            return Err(StargazerError::Config(format!(
                "provider.gemini.api_base is not a valid URL: {}",
                self.provider.gemini.api_base
            ))
            .into());
        }

        if self.provider.gemini.timeout_seconds == Some(0) {
            return Err(StargazerError::Config(
                "provider.gemini.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.greeting.trim().is_empty() {
            return Err(StargazerError::Config("chat.greeting cannot be empty".to_string()).into());
        }

        if self.proxy.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(StargazerError::Config(format!(
                "proxy.bind is not a valid socket address: {}",
                self.proxy.bind
            ))
            .into());
        }

        if url::Url::parse(&self.proxy.upstream_url).is_err() {
            return Err(StargazerError::Config(format!(
                "proxy.upstream_url is not a valid URL: {}",
                self.proxy.upstream_url
            ))
            .into());
        }

        if self.proxy.timeout_seconds == 0 {
            return Err(StargazerError::Config(
                "proxy.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
