//! CSV exporter
//!
//! Fields containing commas, quotes or newlines are quoted, with inner
//! quotes doubled.

use crate::error::{Error, Result};
use crate::export::Exporter;
use crate::extract::TrainingCenter;

/// Column order of the exported file
pub const HEADER: [&str; 10] = [
    "ID",
    "Name",
    "Category",
    "Address",
    "Phone",
    "Email",
    "Website",
    "Description",
    "Latitude",
    "Longitude",
];

/// CSV exporter
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn name(&self) -> &str {
        "csv"
    }

    fn description(&self) -> &str {
        "Spreadsheet-friendly CSV"
    }

    fn content_type(&self) -> &str {
        "text/csv"
    }

    fn render(&self, centers: &[TrainingCenter]) -> Result<String> {
        let mut writer = ::csv::Writer::from_writer(Vec::new());
        let csv_err = |e: ::csv::Error| Error::Server(format!("CSV encoding failed: {}", e));

        writer.write_record(HEADER).map_err(csv_err)?;
        for center in centers {
            writer.write_record(row(center)).map_err(csv_err)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| Error::Server(format!("CSV encoding failed: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| Error::Server(format!("CSV encoding failed: {}", e)))
    }
}

fn row(center: &TrainingCenter) -> [String; 10] {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    [
        center.id.clone(),
        center.name.clone(),
        center.category.to_string(),
        center.address.clone(),
        opt(&center.phone),
        opt(&center.email),
        opt(&center.website),
        opt(&center.description),
        center.coordinates.lat.to_string(),
        center.coordinates.lng.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::samples::centers;

    #[test]
    fn test_header_and_line_count() {
        let output = CsvExporter.render(&centers()).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "ID,Name,Category,Address,Phone,Email,Website,Description,Latitude,Longitude"
        );
    }

    #[test]
    fn test_quoting() {
        let output = CsvExporter.render(&centers()).unwrap();
        let first = output.lines().nth(1).unwrap();

        assert!(first.contains("\"12 Main St, New York, NY\""));
        assert!(first.contains("\"Offers \"\"hot work\"\" certification, evenings\""));
        assert!(first.starts_with("extracted-0-1700000000000,ABC Welding School,blue-collar,"));
        assert!(first.ends_with(",40.75,-74"));
    }

    #[test]
    fn test_fields_recovered_by_reader() {
        let records = centers();
        let output = CsvExporter.render(&records).unwrap();

        let mut reader = ::csv::Reader::from_reader(output.as_bytes());
        let rows: Vec<::csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), records.len());

        for (parsed, original) in rows.iter().zip(&records) {
            let expected = row(original);
            let got: Vec<&str> = parsed.iter().collect();
            assert_eq!(got, expected.iter().map(String::as_str).collect::<Vec<_>>());
            assert_eq!(parsed[8].parse::<f64>().unwrap(), original.coordinates.lat);
            assert_eq!(parsed[9].parse::<f64>().unwrap(), original.coordinates.lng);
        }
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let output = CsvExporter.render(&[]).unwrap();
        assert_eq!(output.lines().count(), 1);
    }
}
