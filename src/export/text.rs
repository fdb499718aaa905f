//! Human-readable text exporter

use crate::error::Result;
use crate::export::Exporter;
use crate::extract::{Category, TrainingCenter};

/// Text exporter - one block per center, grouped counts on top
pub struct TextExporter;

impl Exporter for TextExporter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable summary"
    }

    fn content_type(&self) -> &str {
        "text/plain"
    }

    fn render(&self, centers: &[TrainingCenter]) -> Result<String> {
        let mut output = String::new();

        let count = |category: Category| centers.iter().filter(|c| c.category == category).count();
        output.push_str(&format!("Training centers: {}\n", centers.len()));
        output.push_str(&format!(
            "  blue-collar: {}, white-collar: {}, other: {}\n",
            count(Category::BlueCollar),
            count(Category::WhiteCollar),
            count(Category::Other)
        ));

        for center in centers {
            output.push('\n');
            output.push_str(&format!("{} [{}]\n", center.name, center.category));
            if !center.address.is_empty() {
                output.push_str(&format!("  Address: {}\n", center.address));
            }
            for (label, value) in [
                ("Phone", &center.phone),
                ("Email", &center.email),
                ("Website", &center.website),
                ("About", &center.description),
            ] {
                if let Some(value) = value {
                    output.push_str(&format!("  {}: {}\n", label, value));
                }
            }
            output.push_str(&format!(
                "  Location: ({:.6}, {:.6})\n",
                center.coordinates.lat, center.coordinates.lng
            ));
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::samples::centers;

    #[test]
    fn test_text_export() {
        let output = TextExporter.render(&centers()).unwrap();

        assert!(output.starts_with("Training centers: 2\n"));
        assert!(output.contains("blue-collar: 1, white-collar: 1, other: 0"));
        assert!(output.contains("ABC Welding School [blue-collar]"));
        assert!(output.contains("  Phone: 555-0100"));
        assert!(output.contains("  Location: (40.750000, -74.000000)"));
        assert!(!output.contains("Address: \n"));
    }

    #[test]
    fn test_text_export_empty() {
        let output = TextExporter.render(&[]).unwrap();
        assert_eq!(output.lines().count(), 2);
    }
}
