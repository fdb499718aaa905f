//! Export formatters
//!
//! Renders a list of training centers as a downloadable document.

pub mod csv;
pub mod json;
pub mod text;

use crate::error::{Error, Result};
use crate::extract::TrainingCenter;
use serde::{Deserialize, Serialize};

/// Information about an export format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Trait for export formatters
pub trait Exporter: Send + Sync {
    /// Format name, also the file extension
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// MIME type of the rendered document
    fn content_type(&self) -> &str;

    /// Render the records
    fn render(&self, centers: &[TrainingCenter]) -> Result<String>;

    /// Download file name
    fn file_name(&self) -> String {
        format!("training-centers.{}", self.name())
    }
}

/// Get an exporter by name
pub fn get_exporter(name: &str) -> Option<Box<dyn Exporter>> {
    match name.to_lowercase().as_str() {
        "csv" => Some(Box::new(csv::CsvExporter)),
        "json" => Some(Box::new(json::JsonExporter)),
        "text" => Some(Box::new(text::TextExporter)),
        _ => None,
    }
}

/// Get an exporter by name or fail with a validation error
pub fn require_exporter(name: &str) -> Result<Box<dyn Exporter>> {
    get_exporter(name).ok_or_else(|| {
        let known: Vec<String> = available_formats().into_iter().map(|f| f.name).collect();
        Error::Validation(format!(
            "Unknown export format '{}', expected one of: {}",
            name,
            known.join(", ")
        ))
    })
}

/// List all available formats
pub fn available_formats() -> Vec<FormatInfo> {
    vec![
        FormatInfo {
            name: "csv".to_string(),
            description: "Spreadsheet-friendly CSV".to_string(),
        },
        FormatInfo {
            name: "json".to_string(),
            description: "Pretty-printed JSON array".to_string(),
        },
        FormatInfo {
            name: "text".to_string(),
            description: "Human-readable summary".to_string(),
        },
    ]
}
