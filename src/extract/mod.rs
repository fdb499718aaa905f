//! Training center extraction
//!
//! Turns gathered snippets into [`TrainingCenter`] records with a single
//! generative model call:
//! - `prompt` builds the instruction
//! - `parse` classifies the reply and validates each element
//! - `classify` assigns the category

pub mod classify;
pub mod parse;
pub mod prompt;

pub use classify::Category;

use crate::constants::extract::ID_PREFIX;
use crate::error::{Error, Result};
use crate::geo::{AreaBounds, Coordinates};
use crate::llm::{GenerationParams, TextGenerator};
use parse::{parse_reply, validate_record, CandidateRecord, ReplyShape};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A structured training center record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingCenter {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub coordinates: Coordinates,
}

impl TrainingCenter {
    /// Build a record from a validated model element
    ///
    /// Coordinates are clamped into `bounds`; missing ones default to the
    /// centroid. The category is computed before the source is appended to
    /// the description.
    pub fn from_candidate(
        candidate: CandidateRecord,
        index: usize,
        timestamp: i64,
        bounds: &AreaBounds,
    ) -> Self {
        let centroid = bounds.centroid();
        let coordinates = bounds.clamp(Coordinates::new(
            candidate.lat.unwrap_or(centroid.lat),
            candidate.lng.unwrap_or(centroid.lng),
        ));

        let category = classify::classify(&candidate.name, candidate.description.as_deref());

        let description = match (candidate.description, candidate.source) {
            (Some(d), Some(s)) => Some(format!("{} (Source: {})", d, s)),
            (None, Some(s)) => Some(format!("Source: {}", s)),
            (d, None) => d,
        };

        Self {
            id: format!("{}-{}-{}", ID_PREFIX, index, timestamp),
            name: candidate.name,
            category,
            address: candidate.address.unwrap_or_default(),
            phone: candidate.phone,
            email: candidate.email,
            website: candidate.website,
            description,
            coordinates,
        }
    }
}

/// Snippets in, records out
#[derive(Clone)]
pub struct ExtractionEngine {
    generator: Arc<dyn TextGenerator>,
    params: GenerationParams,
}

impl ExtractionEngine {
    pub fn new(generator: Arc<dyn TextGenerator>, params: GenerationParams) -> Self {
        Self { generator, params }
    }

    /// Extract training centers mentioned in `snippets`
    ///
    /// Individual elements that fail validation are dropped; a reply that
    /// is neither an array nor an explicit "nothing found" is a `Parse`
    /// error.
    pub async fn extract(
        &self,
        snippets: &[String],
        location: &str,
        bounds: &AreaBounds,
    ) -> Result<Vec<TrainingCenter>> {
        let instruction = prompt::build_prompt(snippets, location, bounds);
        debug!(snippets = snippets.len(), chars = instruction.len(), "Sending extraction prompt");

        let reply = self.generator.generate(&instruction, &self.params).await?;
        if reply.trim().is_empty() {
            return Err(Error::EmptyResponse);
        }

        let elements = match parse_reply(&reply) {
            ReplyShape::Records(elements) => elements,
            ReplyShape::Empty => {
                info!("Model reported no training centers in the content");
                return Ok(Vec::new());
            }
            ReplyShape::Malformed => {
                let excerpt: String = reply.chars().take(200).collect();
                return Err(Error::Parse(format!(
                    "no JSON array of records in model reply: {}",
                    excerpt
                )));
            }
        };

        let timestamp = chrono::Utc::now().timestamp_millis();
        let total = elements.len();
        let centers: Vec<TrainingCenter> = elements
            .iter()
            .enumerate()
            .filter_map(|(index, element)| match validate_record(element) {
                Ok(candidate) => Some(TrainingCenter::from_candidate(
                    candidate, index, timestamp, bounds,
                )),
                Err(reason) => {
                    warn!(index, reason = %reason, "Dropping invalid record from model reply");
                    None
                }
            })
            .collect();

        info!(returned = total, kept = centers.len(), "Extracted training centers");
        Ok(centers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::fakes::ScriptedGenerator;
    use approx::assert_relative_eq;

    fn bounds() -> AreaBounds {
        AreaBounds::new(40.8, 40.7, -73.9, -74.1).unwrap()
    }

    fn engine(generator: Arc<ScriptedGenerator>) -> ExtractionEngine {
        ExtractionEngine::new(generator, GenerationParams::precise(0.1, 2048))
    }

    fn snippets() -> Vec<String> {
        vec!["Name: ABC Welding School, Type: school".to_string()]
    }

    #[tokio::test]
    async fn test_extracts_and_classifies() {
        let generator = Arc::new(ScriptedGenerator::replying(
            r#"[{"name": "ABC Welding School", "address": "1 Main St", "description": "Welding certification",
                 "phone": "", "website": "", "email": "", "lat": 40.75, "lng": -74.0, "source": "OpenStreetMap"}]"#,
        ));
        let centers = engine(generator.clone())
            .extract(&snippets(), "New York, NY", &bounds())
            .await
            .unwrap();

        assert_eq!(centers.len(), 1);
        let center = &centers[0];
        assert_eq!(center.category, Category::BlueCollar);
        assert_eq!(center.address, "1 Main St");
        assert!(center.id.starts_with("extracted-0-"));
        assert_eq!(
            center.description.as_deref(),
            Some("Welding certification (Source: OpenStreetMap)")
        );
        assert!(center.phone.is_none());

        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("ABC Welding School"));
        assert!(prompt.contains("New York, NY"));
    }

    #[tokio::test]
    async fn test_clamps_into_bounds() {
        let generator = Arc::new(ScriptedGenerator::replying(
            r#"[{"name": "Far North", "lat": 45.0, "lng": -80.0},
                {"name": "Far South", "lat": "10", "lng": 0},
                {"name": "Nowhere"}]"#,
        ));
        let b = bounds();
        let centers = engine(generator).extract(&snippets(), "x", &b).await.unwrap();

        assert_eq!(centers.len(), 3);
        for center in &centers {
            assert!(b.contains(center.coordinates), "{:?} escaped bounds", center);
        }
        assert_eq!(centers[0].coordinates, Coordinates::new(40.8, -74.1));
        assert_eq!(centers[1].coordinates, Coordinates::new(40.7, -73.9));
        assert_relative_eq!(centers[2].coordinates.lat, 40.75, epsilon = 1e-9);
        assert_relative_eq!(centers[2].coordinates.lng, -74.0, epsilon = 1e-9);
    }

    #[tokio::test]
    async fn test_invalid_records_dropped() {
        let generator = Arc::new(ScriptedGenerator::replying(
            r#"[{"name": "Kept Software Academy", "lat": 40.75, "lng": -74.0},
                {"address": "no name"},
                {"name": "Bad Coords", "lat": "somewhere"}]"#,
        ));
        let centers = engine(generator).extract(&snippets(), "x", &bounds()).await.unwrap();

        assert_eq!(centers.len(), 1);
        assert_eq!(centers[0].name, "Kept Software Academy");
        assert_eq!(centers[0].category, Category::WhiteCollar);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let generator = Arc::new(ScriptedGenerator::replying(
            r#"[{"name": "A"}, {"name": "B"}, {"name": "C"}]"#,
        ));
        let centers = engine(generator).extract(&snippets(), "x", &bounds()).await.unwrap();
        let mut ids: Vec<_> = centers.iter().map(|c| c.id.clone()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_reply_phrase() {
        let generator = Arc::new(ScriptedGenerator::replying(
            "I found no real training centers in this text.",
        ));
        let centers = engine(generator).extract(&snippets(), "x", &bounds()).await.unwrap();
        assert!(centers.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_reply_is_parse_error() {
        let generator = Arc::new(ScriptedGenerator::replying("Sure! Here you go: {oops"));
        let err = engine(generator)
            .extract(&snippets(), "x", &bounds())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[tokio::test]
    async fn test_upstream_errors_propagate() {
        let generator = Arc::new(ScriptedGenerator::failing(Error::Upstream(
            "Gemini API error (403)".to_string(),
        )));
        let err = engine(generator)
            .extract(&snippets(), "x", &bounds())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));

        let generator = Arc::new(ScriptedGenerator::failing(Error::EmptyResponse));
        let err = engine(generator)
            .extract(&snippets(), "x", &bounds())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyResponse));
    }

    #[test]
    fn test_source_without_description() {
        let candidate = CandidateRecord {
            name: "A".to_string(),
            source: Some("DuckDuckGo".to_string()),
            ..Default::default()
        };
        let center = TrainingCenter::from_candidate(candidate, 4, 1700000000000, &bounds());
        assert_eq!(center.id, "extracted-4-1700000000000");
        assert_eq!(center.description.as_deref(), Some("Source: DuckDuckGo"));
        assert_eq!(center.address, "");
    }

    #[test]
    fn test_serialization_shape() {
        let candidate = CandidateRecord {
            name: "A".to_string(),
            lat: Some(40.75),
            lng: Some(-74.0),
            ..Default::default()
        };
        let center = TrainingCenter::from_candidate(candidate, 0, 1, &bounds());
        let json = serde_json::to_value(&center).unwrap();

        assert_eq!(json["category"], "other");
        assert_eq!(json["coordinates"]["lat"], 40.75);
        assert!(json.get("phone").is_none());

        let back: TrainingCenter = serde_json::from_value(json).unwrap();
        assert_eq!(back, center);
    }
}
