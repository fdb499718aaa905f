//! training-mapper: Training Center Discovery
//!
//! A library, CLI tool and web service that finds vocational and professional
//! training centers inside a rectangle on the map. Web search snippets and
//! OpenStreetMap facilities are gathered for the area, a language model turns
//! them into structured records, and each record is classified as blue-collar
//! or white-collar.
//!
//! ## Features
//!
//! - Reverse geocoding of the selected area (Nominatim)
//! - Rate-limited content gathering (DuckDuckGo, Overpass)
//! - Strict parsing and per-record validation of model output
//! - CSV, JSON and text export
//! - HTTP API + CLI interface with connectivity diagnostics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use training_mapper::{AreaBounds, Config};
//! use training_mapper::llm::build_generator;
//! use training_mapper::pipeline::Pipeline;
//!
//! # async fn demo() -> training_mapper::Result<()> {
//! let config = Config::load_resolved()?;
//! let generator = build_generator(&config)?;
//! let pipeline = Pipeline::from_config(&config, generator)?;
//!
//! let bounds = AreaBounds::new(40.8, 40.7, -73.9, -74.1)?; // Manhattan
//! let outcome = pipeline.run(&bounds).await?;
//! println!("{} centers near {}", outcome.centers().len(), outcome.location());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod extract;
pub mod geo;
pub mod llm;
pub mod pipeline;
pub mod server;
pub mod sources;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use extract::{Category, TrainingCenter};
pub use geo::{AreaBounds, Coordinates};
pub use pipeline::{ExtractionOutcome, Pipeline};
