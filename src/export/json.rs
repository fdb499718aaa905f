//! JSON exporter

use crate::error::Result;
use crate::export::Exporter;
use crate::extract::TrainingCenter;

/// JSON exporter - pretty-printed array of records
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Pretty-printed JSON array"
    }

    fn content_type(&self) -> &str {
        "application/json"
    }

    fn render(&self, centers: &[TrainingCenter]) -> Result<String> {
        Ok(serde_json::to_string_pretty(centers)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::samples::centers;

    #[test]
    fn test_json_export() {
        let records = centers();
        let output = JsonExporter.render(&records).unwrap();

        let parsed: Vec<TrainingCenter> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, records);
        assert!(output.contains("\n  {"));
    }

    #[test]
    fn test_json_exporter_info() {
        assert_eq!(JsonExporter.name(), "json");
        assert_eq!(JsonExporter.content_type(), "application/json");
    }
}
