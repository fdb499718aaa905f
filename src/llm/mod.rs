//! Generative text backends
//!
//! The extraction engine, the health check and the model test endpoint all
//! talk to the model through [`TextGenerator`].

pub mod gemini;
pub mod templates;

use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Sampling settings for one generation call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_k: Option<u32>,
    pub top_p: Option<f32>,
}

impl GenerationParams {
    /// Low temperature, bounded output
    pub fn precise(temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            temperature,
            max_output_tokens,
            top_k: None,
            top_p: None,
        }
    }

    /// Settings used for free-form manual testing
    pub fn conversational() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 1024,
            top_k: Some(40),
            top_p: Some(0.95),
        }
    }
}

/// Model metadata as reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A text-in, text-out language model
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model name used for calls
    fn model(&self) -> &str;

    /// Generate text for a single prompt
    ///
    /// Fails with `Upstream` on transport or non-2xx errors and with
    /// `EmptyResponse` when the reply carries no text.
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;

    /// Fetch metadata for the configured model
    async fn model_info(&self) -> Result<ModelInfo>;
}

/// Build the configured generator, or None when no API key is set
pub fn build_generator(config: &Config) -> Result<Option<Arc<dyn TextGenerator>>> {
    match config.api_key() {
        Ok(key) => {
            let client = gemini::GeminiClient::new(key, &config.gemini.model)?;
            Ok(Some(Arc::new(client)))
        }
        Err(_) => Ok(None),
    }
}
