//! Configuration management for Palaver
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{PalaverError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Main configuration structure for Palaver
///
/// Holds everything the relay server and the terminal client need:
/// upstream provider settings, the server bind address, history storage,
/// and chat session defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Upstream AI provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Relay server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Conversation history storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Chat client configuration
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Upstream provider configuration
///
/// The credential itself never lives in the file; only the name of the
/// environment variable that holds it does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL for the OpenAI-compatible API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for text-only chat turns
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used when the conversation carries attached images
    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    /// Model used for image generation
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// HTTP client timeout for upstream calls (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_vision_model() -> String {
    "gpt-4o".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            chat_model: default_chat_model(),
            vision_model: default_vision_model(),
            image_model: default_image_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Relay server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the server binds to
    #[serde(default = "default_server_host")]
    pub host: String,

    /// Port the server listens on
    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

/// Conversation history storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Database path; when unset the platform data directory is used
    #[serde(default)]
    pub path: Option<String>,
}

/// Chat client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Default response mode: "detailed", "balanced", or "concise"
    #[serde(default = "default_response_mode")]
    pub response_mode: String,

    /// Relay server URL the client talks to; derived from `server`
    /// when unset
    #[serde(default)]
    pub relay_url: Option<String>,
}

fn default_response_mode() -> String {
    "detailed".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            response_mode: default_response_mode(),
            relay_url: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
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
            .map_err(|e| PalaverError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| PalaverError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(api_base) = std::env::var("PALAVER_API_BASE") {
            self.provider.api_base = api_base;
        }

        if let Ok(chat_model) = std::env::var("PALAVER_CHAT_MODEL") {
            self.provider.chat_model = chat_model;
        }

        if let Ok(vision_model) = std::env::var("PALAVER_VISION_MODEL") {
            self.provider.vision_model = vision_model;
        }

        if let Ok(image_model) = std::env::var("PALAVER_IMAGE_MODEL") {
            self.provider.image_model = image_model;
        }

        if let Ok(host) = std::env::var("PALAVER_SERVER_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("PALAVER_SERVER_PORT") {
            if let Ok(value) = port.parse() {
                self.server.port = value;
            } else {
                tracing::warn!("Invalid PALAVER_SERVER_PORT: {}", port);
            }
        }

        if let Ok(relay_url) = std::env::var("PALAVER_RELAY_URL") {
            self.chat.relay_url = Some(relay_url);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// URL the chat client uses to reach the relay server
    ///
    /// Falls back to the configured server bind address when no explicit
    /// relay URL is set.
    pub fn relay_url(&self) -> String {
        self.chat
            .relay_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.server.host, self.server.port))
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Returns
    ///
    /// Returns Ok if configuration is valid
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        validate_http_url("provider.api_base", &self.provider.api_base)?;

        if let Some(ref relay_url) = self.chat.relay_url {
            validate_http_url("chat.relay_url", relay_url)?;
        }

        if self.provider.api_key_env.is_empty() {
            return Err(
                PalaverError::Config("provider.api_key_env cannot be empty".to_string()).into(),
            );
        }

        if self.provider.chat_model.is_empty() {
            return Err(
                PalaverError::Config("provider.chat_model cannot be empty".to_string()).into(),
            );
        }

        if self.provider.vision_model.is_empty() {
            return Err(
                PalaverError::Config("provider.vision_model cannot be empty".to_string()).into(),
            );
        }

        if self.provider.image_model.is_empty() {
            return Err(
                PalaverError::Config("provider.image_model cannot be empty".to_string()).into(),
            );
        }

        if self.provider.timeout_secs == 0 {
            return Err(PalaverError::Config(
                "provider.timeout_secs must be greater than 0".to_string(),
            )
            .into());
        }

        if self.server.port == 0 {
            return Err(
                PalaverError::Config("server.port must be greater than 0".to_string()).into(),
            );
        }

        if let Err(e) = crate::response_mode::ResponseMode::parse_str(&self.chat.response_mode) {
            return Err(PalaverError::Config(format!("chat.response_mode: {}", e)).into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

/// Check that a configured URL parses and uses an HTTP scheme.
fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| PalaverError::Config(format!("{} is not a valid URL: {}", field, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(PalaverError::Config(format!(
            "{} must use http or https, got: {}",
            field,
            url.scheme()
        ))
        .into());
    }

    Ok(())
}
