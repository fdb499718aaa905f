//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/training-mapper/config.toml
//!
//! The generative API key may live in the file, but `GEMINI_API_KEY` in the
//! environment always wins. It is resolved once, when the process starts.

pub mod defaults;

use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Generative language API settings
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Content gathering settings
    #[serde(default)]
    pub search: SearchConfig,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Generative language API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key (overridden by GEMINI_API_KEY)
    #[serde(default)]
    pub api_key: String,

    /// Model name, e.g. "gemini-1.5-flash"
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature for extraction
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output token cap for extraction
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

/// Content gathering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Minimum gap between search queries in milliseconds
    #[serde(default = "default_query_interval")]
    pub query_interval_ms: u64,
}

// Default value functions for serde
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}
fn default_max_output_tokens() -> u32 {
    DEFAULT_MAX_OUTPUT_TOKENS
}
fn default_query_interval() -> u64 {
    DEFAULT_QUERY_INTERVAL_MS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query_interval_ms: default_query_interval(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load configuration and apply the environment override
    ///
    /// This is what the binary calls at startup.
    pub fn load_resolved() -> Result<Self> {
        let mut config = Self::load()?;
        config.resolve_env(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    /// Apply the value of `GEMINI_API_KEY`, if any
    ///
    /// Takes the value rather than reading the environment so callers
    /// (and tests) decide where it comes from.
    pub fn resolve_env(&mut self, env_key: Option<String>) {
        if let Some(key) = env_key {
            let key = key.trim();
            if !key.is_empty() {
                self.gemini.api_key = key.to_string();
            }
        }
    }

    /// The generative API key, or `MissingApiKey`
    pub fn api_key(&self) -> Result<&str> {
        let key = self.gemini.api_key.trim();
        if key.is_empty() {
            Err(Error::MissingApiKey)
        } else {
            Ok(key)
        }
    }

    /// Whether an API key is available
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_ok()
    }

    /// Pause between search queries
    pub fn query_interval(&self) -> Duration {
        Duration::from_millis(self.search.query_interval_ms)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key". The API key is returned unmasked; callers
    /// that print it should use [`Config::masked_api_key`].
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["gemini", "api_key"] => Some(self.gemini.api_key.clone()),
            ["gemini", "model"] => Some(self.gemini.model.clone()),
            ["gemini", "temperature"] => Some(self.gemini.temperature.to_string()),
            ["gemini", "max_output_tokens"] => Some(self.gemini.max_output_tokens.to_string()),

            ["search", "query_interval_ms"] => Some(self.search.query_interval_ms.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid port value: {}", value))
                })?;
            }

            ["gemini", "api_key"] => {
                self.gemini.api_key = value.trim().to_string();
            }
            ["gemini", "model"] => {
                self.gemini.model = value.to_string();
            }
            ["gemini", "temperature"] => {
                let temperature: f32 = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid temperature value: {}", value))
                })?;
                if !(0.0..=2.0).contains(&temperature) {
                    return Err(Error::Config(format!(
                        "Temperature {} is out of range [0, 2]",
                        temperature
                    )));
                }
                self.gemini.temperature = temperature;
            }
            ["gemini", "max_output_tokens"] => {
                self.gemini.max_output_tokens = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid token count: {}", value))
                })?;
            }

            ["search", "query_interval_ms"] => {
                self.search.query_interval_ms = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid interval value: {}", value))
                })?;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "server.host",
            "server.port",
            "gemini.api_key",
            "gemini.model",
            "gemini.temperature",
            "gemini.max_output_tokens",
            "search.query_interval_ms",
        ]
    }

    /// API key suitable for display
    pub fn masked_api_key(&self) -> String {
        if self.has_api_key() {
            "***".to_string()
        } else {
            String::new()
        }
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
