//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::diagnostics::health::check_health;
use crate::diagnostics::{run_probes, DiagnosticsReport, EnvironmentSummary};
use crate::error::Error;
use crate::export::require_exporter;
use crate::extract::TrainingCenter;
use crate::geo::AreaBounds;
use crate::llm::templates::PromptTemplate;
use crate::llm::GenerationParams;
use crate::pipeline::ExtractionOutcome;
use crate::server::state::AppState;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Browser UI: relative to cwd first, then next to the executable
    let static_path = if std::path::Path::new("static").exists() {
        "static".to_string()
    } else {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("static")))
            .filter(|path| path.exists())
            .map(|path| path.to_string_lossy().to_string())
            .unwrap_or_else(|| "static".to_string())
    };

    Router::new()
        .route("/extract", post(extract_handler))
        .route("/export", post(export_handler))
        .route("/health", get(health_handler))
        .route("/diagnostics", get(diagnostics_handler))
        .route("/test-model", post(test_model_handler))
        .fallback_service(ServeDir::new(&static_path).append_index_html_on_directories(true))
        .with_state(state)
}

/// Steps shown to the user when the API key is missing
pub fn api_key_remediation() -> Vec<String> {
    vec![
        "Get a free API key at https://ai.google.dev/".to_string(),
        "Set GEMINI_API_KEY=<your key> in the server environment, or run `training-mapper config gemini.api_key <your key>`".to_string(),
        "Restart the server".to_string(),
    ]
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(skip, default = "internal_status")]
    pub status: StatusCode,
    pub success: bool,
    pub error: String,
    pub code: String,
    /// Always empty; lets clients treat every reply the same way
    #[serde(default)]
    pub centers: Vec<TrainingCenter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<Vec<String>>,
}

fn internal_status() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

impl ApiError {
    fn new(status: StatusCode, code: &str, error: impl Into<String>) -> Self {
        Self {
            status,
            success: false,
            error: error.into(),
            code: code.to_string(),
            centers: Vec::new(),
            details: None,
            remediation: None,
        }
    }

    fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::MissingApiKey => {
                let mut api_error = ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIG_ERROR",
                    "Gemini API key is not configured",
                )
                .with_details("GEMINI_API_KEY is not set for the server process");
                api_error.remediation = Some(api_key_remediation());
                api_error
            }
            Error::Validation(msg) => ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            Error::Upstream(msg) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPSTREAM_ERROR",
                "The language model service request failed. Check the API key and try again.",
            )
            .with_details(msg),
            Error::EmptyResponse => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "EMPTY_RESPONSE",
                "The language model returned an empty response. Please try again.",
            ),
            Error::Parse(msg) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "PARSE_ERROR",
                "Could not understand the language model's response. Please try again.",
            )
            .with_details(msg),
            other => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                other.to_string(),
            ),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Invalid JSON body: {}", rejection.body_text()),
        )
    }
}

/// Provenance counts for an extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCounts {
    /// Snippets gathered from search and geodata
    pub web_content: usize,
    /// Whether the language model was called
    pub gemini_analysis: bool,
    /// Records returned
    pub extracted_centers: usize,
}

/// Extract response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub centers: Vec<TrainingCenter>,
    pub bounds: AreaBounds,
    pub location: String,
    pub sources: SourceCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractResponse {
    fn from_outcome(outcome: ExtractionOutcome, bounds: AreaBounds) -> Self {
        let sources = SourceCounts {
            web_content: outcome.snippet_count(),
            gemini_analysis: outcome.model_invoked(),
            extracted_centers: outcome.centers().len(),
        };
        let error = outcome.message().map(str::to_string);
        let location = outcome.location().to_string();
        let centers = match outcome {
            ExtractionOutcome::Found { centers, .. } => centers,
            _ => Vec::new(),
        };

        Self {
            success: error.is_none(),
            centers,
            bounds,
            location,
            sources,
            error,
        }
    }
}

/// Extract training centers inside a rectangle
///
/// POST /extract
async fn extract_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let Json(body) = payload?;
    let raw_bounds = body
        .get("bounds")
        .ok_or_else(|| Error::Validation("bounds is required".to_string()))?;
    let bounds = AreaBounds::from_value(raw_bounds)?;

    let span = info_span!("extract", request_id = %Uuid::new_v4());
    let outcome = async {
        info!(?bounds, "Extraction requested");
        state.pipeline.run(&bounds).await
    }
    .instrument(span)
    .await
    .map_err(|e| {
        warn!(error = %e, "Extraction failed");
        ApiError::from(e)
    })?;

    Ok(Json(ExtractResponse::from_outcome(outcome, bounds)))
}

/// Export training centers as a file download
///
/// POST /export
async fn export_handler(payload: Result<Json<Value>, JsonRejection>) -> Result<Response, ApiError> {
    let Json(body) = payload?;

    let centers = match body.get("centers") {
        Some(Value::Array(_)) => {
            serde_json::from_value::<Vec<TrainingCenter>>(body["centers"].clone()).map_err(|e| {
                Error::Validation(format!("Invalid centers data provided: {}", e))
            })?
        }
        _ => {
            return Err(Error::Validation("Invalid centers data provided".to_string()).into());
        }
    };

    let format = match body.get("format") {
        None | Some(Value::Null) => "json",
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            return Err(Error::Validation(format!("format must be a string, got {}", other)).into());
        }
    };

    let exporter = require_exporter(format)?;
    let content = exporter.render(&centers)?;

    Ok((
        [
            (header::CONTENT_TYPE, exporter.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", exporter.file_name()),
            ),
        ],
        content,
    )
        .into_response())
}

/// Language model health check
///
/// GET /health
async fn health_handler(State(state): State<Arc<AppState>>) -> Response {
    let report = check_health(state.generator.as_deref()).await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(report)).into_response()
}

/// Reachability of every external dependency
///
/// GET /diagnostics
async fn diagnostics_handler(State(state): State<Arc<AppState>>) -> Json<DiagnosticsReport> {
    let environment = EnvironmentSummary::from_config(&state.config);
    Json(run_probes(&state.probes, environment).await)
}

/// Model test request body
#[derive(Debug, Deserialize)]
pub struct TestModelRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
}

/// Model test response body
#[derive(Debug, Serialize, Deserialize)]
pub struct TestModelResponse {
    pub success: bool,
    pub message: String,
    pub template: PromptTemplate,
    pub model: String,
    pub timestamp: DateTime<Utc>,
}

/// Free-form prompt passthrough for manual testing
///
/// POST /test-model
async fn test_model_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TestModelRequest>, JsonRejection>,
) -> Result<Json<TestModelResponse>, ApiError> {
    let Json(req) = payload?;

    let template = match req.template.as_deref() {
        Some(name) => name.parse::<PromptTemplate>()?,
        None => PromptTemplate::default(),
    };
    let generator = state.generator.as_ref().ok_or(Error::MissingApiKey)?;

    let message = req
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| "Hello, how are you?".to_string());

    let reply = generator
        .generate(&template.render(&message), &GenerationParams::conversational())
        .await?;

    Ok(Json(TestModelResponse {
        success: true,
        message: reply,
        template,
        model: generator.model().to_string(),
        timestamp: Utc::now(),
    }))
}
