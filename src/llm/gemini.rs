//! Google Gemini backend
//!
//! Uses the v1beta REST API: `models/{model}:generateContent` for text and
//! `models/{model}` for metadata. The key travels in the `x-goog-api-key`
//! header and never appears in a URL or error message.

use crate::constants::api::{GEMINI_URL, USER_AGENT};
use crate::error::{Error, Result};
use crate::llm::{GenerationParams, ModelInfo, TextGenerator};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Gemini client
///
/// Not `Debug`: it holds the API key.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            http,
            base_url: GEMINI_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn model_url(&self, suffix: &str) -> String {
        format!("{}/models/{}{}", self.base_url, self.model, suffix)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| Error::Config("Gemini API key contains invalid characters".to_string()))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", key);
        Ok(headers)
    }

    /// Transport failure without the request URL
    fn transport_error(e: reqwest::Error) -> Error {
        Error::Upstream(format!("Gemini request failed: {}", e.without_url()))
    }

    fn request_body<'a>(prompt: &'a str, params: &GenerationParams) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_output_tokens,
                top_k: params.top_k,
                top_p: params.top_p,
            },
        }
    }

    /// Text of the first candidate's first part
    fn first_text(body: &str) -> Result<String> {
        let response: GenerateResponse = serde_json::from_str(body)
            .map_err(|e| Error::Upstream(format!("Failed to parse Gemini response: {}", e)))?;

        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or(Error::EmptyResponse)
    }

    async fn read_success(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("Gemini response unreadable: {}", e.without_url())))?;

        if !status.is_success() {
            return Err(Error::Upstream(format!("Gemini API error ({}): {}", status, body)));
        }
        Ok(body)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        debug!(model = %self.model, prompt_len = prompt.len(), "Gemini generate request");

        let response = self
            .http
            .post(self.model_url(":generateContent"))
            .headers(self.headers()?)
            .json(&Self::request_body(prompt, params))
            .send()
            .await
            .map_err(Self::transport_error)?;

        let body = Self::read_success(response).await?;
        Self::first_text(&body)
    }

    async fn model_info(&self) -> Result<ModelInfo> {
        let response = self
            .http
            .get(self.model_url(""))
            .headers(self.headers()?)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let body = Self::read_success(response).await?;
        serde_json::from_str(&body)
            .map_err(|e| Error::Upstream(format!("Failed to parse Gemini model info: {}", e)))
    }
}
