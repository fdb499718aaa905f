//! Language model health check
//!
//! Confirms the key is configured, the model exists, and a tiny generation
//! round-trips a known phrase.

use crate::error::Error;
use crate::llm::{GenerationParams, ModelInfo, TextGenerator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Phrase the model is asked to echo
pub const HEALTH_PHRASE: &str = "API is working";

const HEALTH_PROMPT: &str = "Respond with 'API is working' if you can read this message.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Error,
}

/// Health check report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelInfo>,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    fn healthy(model: ModelInfo) -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: Some("Gemini API is connected and working properly".to_string()),
            error: None,
            model: Some(model),
            timestamp: Utc::now(),
        }
    }

    fn error(error: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Error,
            message: None,
            error: Some(error.into()),
            model: None,
            timestamp: Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Run the health check
///
/// `None` means no API key is configured.
pub async fn check_health(generator: Option<&dyn TextGenerator>) -> HealthReport {
    let Some(generator) = generator else {
        return HealthReport::error(Error::MissingApiKey.to_string());
    };

    let model = match generator.model_info().await {
        Ok(model) => model,
        Err(e) => return HealthReport::error(format!("Model lookup failed: {}", e)),
    };

    let reply = match generator
        .generate(HEALTH_PROMPT, &GenerationParams::precise(0.0, 10))
        .await
    {
        Ok(reply) => reply,
        Err(e) => return HealthReport::error(format!("Generation test failed: {}", e)),
    };

    if reply.to_lowercase().contains(&HEALTH_PHRASE.to_lowercase()) {
        HealthReport::healthy(model)
    } else {
        HealthReport::error("Gemini API response validation failed")
    }
}
