//! Overpass geodata source (OpenStreetMap)
//!
//! Pulls named educational amenities inside the selected rectangle.

use crate::constants::api::{OVERPASS_URL, USER_AGENT};
use crate::constants::search::FACILITY_AMENITIES;
use crate::error::{Error, Result};
use crate::geo::AreaBounds;
use crate::sources::{Facility, GeodataSource};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// Overpass interpreter backend
#[derive(Debug, Clone)]
pub struct OverpassSource {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(default)]
    tags: HashMap<String, String>,
}

impl OverpassSource {
    /// Create a new Overpass source
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            url: OVERPASS_URL.to_string(),
        })
    }

    /// Overpass QL selecting educational amenities inside `bounds`
    pub fn build_query(bounds: &AreaBounds) -> String {
        let filter = format!("[\"amenity\"~\"^({})$\"]", FACILITY_AMENITIES.join("|"));
        let bbox = format!(
            "({},{},{},{})",
            bounds.south, bounds.west, bounds.north, bounds.east
        );
        format!(
            "[out:json][timeout:25];\n(\n  node{filter}{bbox};\n  way{filter}{bbox};\n);\nout center tags;",
            filter = filter,
            bbox = bbox
        )
    }

    fn parse_elements(body: &str) -> Result<Vec<Facility>> {
        let response: OverpassResponse = serde_json::from_str(body)
            .map_err(|e| Error::Upstream(format!("Failed to parse Overpass response: {}", e)))?;

        Ok(response
            .elements
            .into_iter()
            .filter_map(OverpassElement::into_facility)
            .collect())
    }
}

impl OverpassElement {
    /// Elements without a name tag are dropped
    fn into_facility(mut self) -> Option<Facility> {
        let name = self.tags.remove("name").filter(|n| !n.trim().is_empty())?;

        let street = [self.tags.get("addr:housenumber"), self.tags.get("addr:street")]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        let address = [Some(street.as_str()), self.tags.get("addr:city").map(String::as_str)]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        let mut tag = |key: &str| self.tags.remove(key).filter(|v| !v.trim().is_empty());

        Some(Facility {
            name,
            operator: tag("operator"),
            amenity: tag("amenity"),
            description: tag("description"),
            website: tag("website").or_else(|| tag("contact:website")),
            phone: tag("phone").or_else(|| tag("contact:phone")),
            address: Some(address).filter(|a| !a.is_empty()),
        })
    }
}

#[async_trait]
impl GeodataSource for OverpassSource {
    async fn facilities(&self, bounds: &AreaBounds) -> Result<Vec<Facility>> {
        let query = Self::build_query(bounds);

        let response = self
            .client
            .post(&self.url)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Overpass request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Upstream(format!(
                "Overpass returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("Overpass response unreadable: {}", e)))?;
        Self::parse_elements(&body)
    }
}
