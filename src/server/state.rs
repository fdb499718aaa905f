//! Server shared state
//!
//! Everything here is built once at startup and only read afterwards.

use crate::config::Config;
use crate::diagnostics::{default_probes, Probe};
use crate::error::Result;
use crate::llm::{build_generator, TextGenerator};
use crate::pipeline::Pipeline;
use std::sync::Arc;
use tracing::warn;

/// Shared state for the HTTP server
pub struct AppState {
    /// Resolved configuration
    pub config: Arc<Config>,

    /// Extraction pipeline
    pub pipeline: Pipeline,

    /// Language model client, None when no API key is configured
    pub generator: Option<Arc<dyn TextGenerator>>,

    /// Diagnostics probes
    pub probes: Vec<Arc<dyn Probe>>,
}

impl AppState {
    /// Create application state with the production collaborators
    pub fn new(config: Config) -> Result<Self> {
        let generator = build_generator(&config)?;
        if generator.is_none() {
            warn!("GEMINI_API_KEY is not set; /extract and /health will report a configuration error");
        }

        let pipeline = Pipeline::from_config(&config, generator.clone())?;
        let probes = default_probes(&config, generator.clone())?;

        Ok(Self::from_parts(config, pipeline, generator, probes))
    }

    /// Assemble state from explicit collaborators
    pub fn from_parts(
        config: Config,
        pipeline: Pipeline,
        generator: Option<Arc<dyn TextGenerator>>,
        probes: Vec<Arc<dyn Probe>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            pipeline,
            generator,
            probes,
        }
    }
}
