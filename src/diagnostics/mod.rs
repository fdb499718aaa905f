//! Service diagnostics
//!
//! Independent reachability probes for every external dependency, plus the
//! language model health check. Probes never fail; they report.

pub mod health;

use crate::config::Config;
use crate::constants::api::{DUCKDUCKGO_URL, NOMINATIM_URL, OVERPASS_URL, USER_AGENT};
use crate::error::Result;
use crate::llm::TextGenerator;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Outcome of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProbeStatus {
    Passed,
    Failed,
}

/// Report of a single probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub status: ProbeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
}

impl ProbeResult {
    pub fn passed(message: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Passed,
            message: Some(message.into()),
            error: None,
            details: None,
            solution: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Failed,
            message: None,
            error: Some(error.into()),
            details: None,
            solution: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_solution(mut self, solution: impl Into<String>) -> Self {
        self.solution = Some(solution.into());
        self
    }

    pub fn is_failed(&self) -> bool {
        self.status == ProbeStatus::Failed
    }
}

/// A named health check against one dependency
#[async_trait]
pub trait Probe: Send + Sync {
    /// Key under which the result is reported
    fn name(&self) -> &str;

    async fn run(&self) -> ProbeResult;
}

/// Whether the API key is configured (no network)
pub struct ApiKeyProbe {
    configured: bool,
}

impl ApiKeyProbe {
    pub fn new(configured: bool) -> Self {
        Self { configured }
    }
}

#[async_trait]
impl Probe for ApiKeyProbe {
    fn name(&self) -> &str {
        "geminiConfig"
    }

    async fn run(&self) -> ProbeResult {
        if self.configured {
            ProbeResult::passed("Gemini API key is configured")
        } else {
            ProbeResult::failed("GEMINI_API_KEY environment variable is not set")
                .with_solution("Add GEMINI_API_KEY to your environment variables")
        }
    }
}

/// Model metadata lookup through the configured generator
pub struct ModelProbe {
    generator: Arc<dyn TextGenerator>,
}

impl ModelProbe {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Probe for ModelProbe {
    fn name(&self) -> &str {
        "geminiConnectivity"
    }

    async fn run(&self) -> ProbeResult {
        match self.generator.model_info().await {
            Ok(_) => ProbeResult::passed("Gemini API is accessible and responding"),
            Err(e) => ProbeResult::failed("Gemini API is not responding")
                .with_details(e.to_string())
                .with_solution("Check that your API key is valid and has access to the configured model"),
        }
    }
}

/// How an [`HttpProbe`] calls its endpoint
#[derive(Debug, Clone)]
pub enum ProbeRequest {
    Get(String),
    /// Form-encoded POST with a single `data` field
    PostData(String, String),
}

/// Plain reachability check of a public endpoint
pub struct HttpProbe {
    name: String,
    label: String,
    request: ProbeRequest,
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(name: &str, label: &str, request: ProbeRequest) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            name: name.to_string(),
            label: label.to_string(),
            request,
            client,
        })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> ProbeResult {
        let builder = match &self.request {
            ProbeRequest::Get(url) => self.client.get(url),
            ProbeRequest::PostData(url, data) => {
                self.client.post(url).form(&[("data", data.as_str())])
            }
        };

        match builder.send().await {
            Ok(response) if response.status().is_success() => {
                ProbeResult::passed(format!("{} is accessible", self.label))
            }
            Ok(response) => {
                ProbeResult::failed(format!("{} returned {}", self.label, response.status()))
            }
            Err(e) => ProbeResult::failed(format!("Cannot reach {}", self.label))
                .with_details(e.to_string())
                .with_solution("Check your internet connection and firewall settings"),
        }
    }
}

/// The standard probe set for a configuration
pub fn default_probes(
    config: &Config,
    generator: Option<Arc<dyn TextGenerator>>,
) -> Result<Vec<Arc<dyn Probe>>> {
    let mut probes: Vec<Arc<dyn Probe>> = vec![Arc::new(ApiKeyProbe::new(config.has_api_key()))];

    if let Some(generator) = generator {
        probes.push(Arc::new(ModelProbe::new(generator)));
    }

    probes.push(Arc::new(HttpProbe::new(
        "nominatim",
        "Nominatim geocoding API",
        ProbeRequest::Get(format!("{}/search?q=New+York&format=json&limit=1", NOMINATIM_URL)),
    )?));
    probes.push(Arc::new(HttpProbe::new(
        "duckduckgo",
        "DuckDuckGo API",
        ProbeRequest::Get(format!(
            "{}/?q=test&format=json&no_html=1&skip_disambig=1",
            DUCKDUCKGO_URL
        )),
    )?));
    probes.push(Arc::new(HttpProbe::new(
        "overpass",
        "OpenStreetMap Overpass API",
        ProbeRequest::PostData(
            OVERPASS_URL.to_string(),
            "[out:json][timeout:5];node(40.7,-74.1,40.8,-74.0)[amenity=school];out 1;".to_string(),
        ),
    )?));

    Ok(probes)
}

/// Non-secret facts about the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSummary {
    pub version: String,
    pub has_gemini_key: bool,
    pub gemini_key_length: usize,
    pub model: String,
}

impl EnvironmentSummary {
    pub fn from_config(config: &Config) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            has_gemini_key: config.has_api_key(),
            gemini_key_length: config.api_key().map(str::len).unwrap_or(0),
            model: config.gemini.model.clone(),
        }
    }
}

/// Aggregate status across probes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Healthy,
    IssuesDetected,
}

/// Full diagnostics report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsReport {
    pub timestamp: DateTime<Utc>,
    pub environment: EnvironmentSummary,
    pub tests: BTreeMap<String, ProbeResult>,
    pub overall_status: OverallStatus,
    pub failed_test_count: usize,
    pub total_test_count: usize,
}

/// Run probes one after another and aggregate
pub async fn run_probes(
    probes: &[Arc<dyn Probe>],
    environment: EnvironmentSummary,
) -> DiagnosticsReport {
    let mut tests = BTreeMap::new();
    for probe in probes {
        let result = probe.run().await;
        debug!(probe = probe.name(), status = ?result.status, "Probe finished");
        tests.insert(probe.name().to_string(), result);
    }

    let failed = tests.values().filter(|r| r.is_failed()).count();

    DiagnosticsReport {
        timestamp: Utc::now(),
        environment,
        overall_status: if failed == 0 {
            OverallStatus::Healthy
        } else {
            OverallStatus::IssuesDetected
        },
        failed_test_count: failed,
        total_test_count: tests.len(),
        tests,
    }
}
