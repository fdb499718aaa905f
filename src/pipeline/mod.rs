//! Request orchestration
//!
//! Runs one extraction request strictly in order:
//! centroid -> place name -> snippets -> records.
//! Requests share the HTTP clients and one search rate limiter, so
//! concurrent requests are paced together against the search API.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract::{ExtractionEngine, TrainingCenter};
use crate::geo::{get_geocoder, resolve_place_name, AreaBounds, Geocoder};
use crate::llm::{GenerationParams, TextGenerator};
use crate::sources::duckduckgo::DuckDuckGoSource;
use crate::sources::overpass::OverpassSource;
use crate::sources::throttle::TokenBucket;
use crate::sources::ContentAggregator;
use std::sync::Arc;
use tracing::info;

/// Shown when neither source produced any text
pub const NO_CONTENT_MESSAGE: &str =
    "No information found about training centers in this area. Try selecting a larger area or a different location.";

/// Shown when text was found but the model extracted nothing from it
pub const NOTHING_EXTRACTED_MESSAGE: &str =
    "No training centers could be extracted from the information found in this area.";

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// The aggregator found nothing; the model was not called
    NoContent { location: String },
    /// The model found nothing in the gathered content
    NothingExtracted {
        location: String,
        snippet_count: usize,
    },
    /// Records were extracted
    Found {
        location: String,
        snippet_count: usize,
        centers: Vec<TrainingCenter>,
    },
}

impl ExtractionOutcome {
    pub fn location(&self) -> &str {
        match self {
            ExtractionOutcome::NoContent { location }
            | ExtractionOutcome::NothingExtracted { location, .. }
            | ExtractionOutcome::Found { location, .. } => location,
        }
    }

    pub fn snippet_count(&self) -> usize {
        match self {
            ExtractionOutcome::NoContent { .. } => 0,
            ExtractionOutcome::NothingExtracted { snippet_count, .. }
            | ExtractionOutcome::Found { snippet_count, .. } => *snippet_count,
        }
    }

    /// Whether the language model was invoked
    pub fn model_invoked(&self) -> bool {
        !matches!(self, ExtractionOutcome::NoContent { .. })
    }

    pub fn centers(&self) -> &[TrainingCenter] {
        match self {
            ExtractionOutcome::Found { centers, .. } => centers,
            _ => &[],
        }
    }

    /// User-facing explanation when nothing was found
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ExtractionOutcome::NoContent { .. } => Some(NO_CONTENT_MESSAGE),
            ExtractionOutcome::NothingExtracted { .. } => Some(NOTHING_EXTRACTED_MESSAGE),
            ExtractionOutcome::Found { .. } => None,
        }
    }
}

/// Geocoder + aggregator + extraction engine
#[derive(Clone)]
pub struct Pipeline {
    geocoder: Arc<dyn Geocoder>,
    aggregator: ContentAggregator,
    /// Absent when no API key is configured
    engine: Option<ExtractionEngine>,
}

impl Pipeline {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        aggregator: ContentAggregator,
        engine: Option<ExtractionEngine>,
    ) -> Self {
        Self {
            geocoder,
            aggregator,
            engine,
        }
    }

    /// Build the production pipeline from configuration
    ///
    /// `generator` is the shared model client, None when no key is set.
    pub fn from_config(config: &Config, generator: Option<Arc<dyn TextGenerator>>) -> Result<Self> {
        let aggregator = ContentAggregator::new(
            Arc::new(DuckDuckGoSource::new()?),
            Arc::new(OverpassSource::new()?),
            Arc::new(TokenBucket::per_interval(config.query_interval())),
        );

        let engine = generator.map(|generator| {
            ExtractionEngine::new(
                generator,
                GenerationParams::precise(
                    config.gemini.temperature,
                    config.gemini.max_output_tokens,
                ),
            )
        });

        Ok(Self::new(
            Arc::new(get_geocoder()?),
            aggregator,
            engine,
        ))
    }

    /// Run the pipeline for validated bounds
    ///
    /// Fails fast with `MissingApiKey` before any remote call. Search and
    /// geodata failures are absorbed by the aggregator; model failures abort.
    pub async fn run(&self, bounds: &AreaBounds) -> Result<ExtractionOutcome> {
        let engine = self.engine.as_ref().ok_or(Error::MissingApiKey)?;
        bounds.validate()?;

        let location = resolve_place_name(self.geocoder.as_ref(), bounds.centroid()).await;
        info!(location = %location, "Resolved area location");

        let snippets = self.aggregator.gather(&location, bounds).await;
        if snippets.is_empty() {
            info!("No web content found, skipping extraction");
            return Ok(ExtractionOutcome::NoContent { location });
        }

        let snippet_count = snippets.len();
        let centers = engine.extract(&snippets, &location, bounds).await?;

        if centers.is_empty() {
            Ok(ExtractionOutcome::NothingExtracted {
                location,
                snippet_count,
            })
        } else {
            Ok(ExtractionOutcome::Found {
                location,
                snippet_count,
                centers,
            })
        }
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    //! Pipeline assembled from in-memory collaborators

    use super::*;
    use crate::geo::{Address, Coordinates};
    use crate::llm::fakes::ScriptedGenerator;
    use crate::sources::fakes::{FixedGeodata, ScriptedSearch};
    use crate::sources::throttle::Unlimited;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Geocoder with a fixed answer that counts lookups
    pub struct FixedGeocoder {
        pub address: Option<Address>,
        pub calls: Mutex<usize>,
    }

    impl FixedGeocoder {
        pub fn new(city: &str, state: &str) -> Self {
            Self {
                address: Some(Address {
                    city: Some(city.to_string()),
                    state: Some(state.to_string()),
                    country: None,
                }),
                calls: Mutex::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn reverse_geocode(&self, _at: Coordinates) -> Result<Option<Address>> {
            *self.calls.lock().unwrap() += 1;
            Ok(self.address.clone())
        }
    }

    /// Handles on every fake so tests can inspect call counts
    pub struct Harness {
        pub geocoder: Arc<FixedGeocoder>,
        pub search: Arc<ScriptedSearch>,
        pub geodata: Arc<FixedGeodata>,
        pub generator: Arc<ScriptedGenerator>,
    }

    impl Harness {
        pub fn new(
            search: ScriptedSearch,
            geodata: FixedGeodata,
            generator: ScriptedGenerator,
        ) -> Self {
            Self {
                geocoder: Arc::new(FixedGeocoder::new("New York", "NY")),
                search: Arc::new(search),
                geodata: Arc::new(geodata),
                generator: Arc::new(generator),
            }
        }

        fn aggregator(&self) -> ContentAggregator {
            ContentAggregator::new(
                self.search.clone(),
                self.geodata.clone(),
                Arc::new(Unlimited),
            )
        }

        pub fn pipeline(&self) -> Pipeline {
            Pipeline::new(
                self.geocoder.clone(),
                self.aggregator(),
                Some(ExtractionEngine::new(
                    self.generator.clone(),
                    GenerationParams::precise(0.1, 2048),
                )),
            )
        }

        /// Same collaborators, but no API key configured
        pub fn pipeline_without_key(&self) -> Pipeline {
            Pipeline::new(self.geocoder.clone(), self.aggregator(), None)
        }

        /// Total remote calls issued so far
        pub fn remote_calls(&self) -> usize {
            self.geocoder.call_count()
                + self.search.query_count()
                + self.geodata.call_count()
                + self.generator.call_count()
        }
    }
}
