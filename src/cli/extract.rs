//! Extract command handler
//!
//! Runs the discovery pipeline for a rectangle from the command line.

use crate::config::Config;
use crate::error::Result;
use crate::export::{require_exporter, Exporter};
use crate::geo::AreaBounds;
use crate::llm::build_generator;
use crate::pipeline::Pipeline;
use clap::Args;

/// Extract command arguments
#[derive(Args)]
pub struct ExtractArgs {
    /// Northern latitude of the rectangle
    #[arg(long, allow_negative_numbers = true)]
    pub north: f64,

    /// Southern latitude of the rectangle
    #[arg(long, allow_negative_numbers = true)]
    pub south: f64,

    /// Eastern longitude of the rectangle
    #[arg(long, allow_negative_numbers = true)]
    pub east: f64,

    /// Western longitude of the rectangle
    #[arg(long, allow_negative_numbers = true)]
    pub west: f64,

    /// Output format (csv, json, text)
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,
}

/// Run the extract command
pub async fn run(args: ExtractArgs) -> Result<()> {
    super::init_logging("info");

    // Fail on bad input before anything else
    let bounds = AreaBounds::new(args.north, args.south, args.east, args.west)?;
    let exporter = select_exporter(args.format.as_deref())?;

    let config = Config::load_resolved()?;
    let generator = build_generator(&config)?;
    let pipeline = Pipeline::from_config(&config, generator)?;

    let outcome = pipeline.run(&bounds).await?;
    eprintln!(
        "Area: {} ({} snippets gathered)",
        outcome.location(),
        outcome.snippet_count()
    );

    if let Some(message) = outcome.message() {
        eprintln!("{}", message);
        return Ok(());
    }

    let output = exporter.render(outcome.centers())?;

    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Exporter for `--format`, plain text when omitted
fn select_exporter(format: Option<&str>) -> Result<Box<dyn Exporter>> {
    require_exporter(format.unwrap_or("text"))
}
