//! Nominatim reverse geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim API.
//! Usage policy requires an identifying User-Agent.

use crate::constants::api::{NOMINATIM_URL, USER_AGENT};
use crate::error::{Error, Result};
use crate::geo::{Address, Coordinates, Geocoder};
use async_trait::async_trait;
use serde::Deserialize;

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
}

/// Nominatim reverse response
#[derive(Debug, Deserialize)]
struct NominatimReverse {
    #[serde(default)]
    address: Option<NominatimAddress>,
    /// Present instead of an address when nothing is at the point
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl From<NominatimAddress> for Address {
    fn from(a: NominatimAddress) -> Self {
        Address {
            city: a.city.or(a.town).or(a.village),
            state: a.state,
            country: a.country,
        }
    }
}

impl NominatimBackend {
    /// Create a new Nominatim backend
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: NOMINATIM_URL.to_string(),
        })
    }

    /// Point the backend at a different Nominatim instance
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn reverse_url(&self, at: Coordinates) -> String {
        format!(
            "{}/reverse?format=json&lat={}&lon={}&addressdetails=1",
            self.base_url, at.lat, at.lng
        )
    }

    fn parse_reverse(body: &str) -> Result<Option<Address>> {
        let parsed: NominatimReverse = serde_json::from_str(body)
            .map_err(|e| Error::Upstream(format!("Failed to parse Nominatim response: {}", e)))?;

        if parsed.error.is_some() {
            return Ok(None);
        }
        Ok(parsed.address.map(Address::from))
    }
}

#[async_trait]
impl Geocoder for NominatimBackend {
    async fn reverse_geocode(&self, at: Coordinates) -> Result<Option<Address>> {
        let response = self
            .client
            .get(self.reverse_url(at))
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }
            return Err(Error::Upstream(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("Nominatim response unreadable: {}", e)))?;
        Self::parse_reverse(&body)
    }
}
