//! Content gathering
//!
//! Collects raw text snippets about an area from two independent sources:
//! a web search API (queried once per fixed template) and a geodata API
//! (queried once for the whole rectangle). Either source failing only
//! costs the snippets it would have produced.

pub mod duckduckgo;
pub mod overpass;
pub mod throttle;

use crate::constants::search::{MAX_RELATED_TOPICS, QUERY_TEMPLATES};
use crate::error::Result;
use crate::geo::AreaBounds;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use throttle::RateLimiter;
use tracing::{debug, info, warn};

/// What one search query returned
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHit {
    /// Summary text, if the engine had one
    pub abstract_text: Option<String>,
    /// Texts of related topics, in engine order
    pub related: Vec<String>,
}

/// A named facility from the geodata source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub name: String,
    pub operator: Option<String>,
    pub amenity: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Facility {
    /// One-line text rendering, empty fields omitted
    pub fn snippet(&self) -> String {
        let fields = [
            ("Name", Some(&self.name)),
            ("Operator", self.operator.as_ref()),
            ("Type", self.amenity.as_ref()),
            ("Description", self.description.as_ref()),
            ("Website", self.website.as_ref()),
            ("Phone", self.phone.as_ref()),
            ("Address", self.address.as_ref()),
        ];

        fields
            .iter()
            .filter_map(|(label, value)| {
                value
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .map(|v| format!("{}: {}", label, v))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A web search API
#[async_trait]
pub trait SearchSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchHit>;
}

/// A geographic facility database
#[async_trait]
pub trait GeodataSource: Send + Sync {
    /// Named educational facilities inside `bounds`
    async fn facilities(&self, bounds: &AreaBounds) -> Result<Vec<Facility>>;
}

/// Expand the fixed query templates for a place
pub fn search_queries(location: &str) -> Vec<String> {
    QUERY_TEMPLATES
        .iter()
        .map(|t| t.replace("{loc}", location))
        .collect()
}

/// Sequential snippet collector over a search and a geodata source
#[derive(Clone)]
pub struct ContentAggregator {
    search: Arc<dyn SearchSource>,
    geodata: Arc<dyn GeodataSource>,
    limiter: Arc<dyn RateLimiter>,
}

impl ContentAggregator {
    pub fn new(
        search: Arc<dyn SearchSource>,
        geodata: Arc<dyn GeodataSource>,
        limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            search,
            geodata,
            limiter,
        }
    }

    /// Gather snippets for a place and rectangle
    ///
    /// Search snippets come first, in query order, then geodata snippets in
    /// result order. Nothing is de-duplicated.
    pub async fn gather(&self, location: &str, bounds: &AreaBounds) -> Vec<String> {
        let mut snippets = self.gather_search(location).await;
        let search_count = snippets.len();

        snippets.extend(self.gather_geodata(bounds).await);

        info!(
            location,
            search = search_count,
            geodata = snippets.len() - search_count,
            "Collected web content"
        );
        snippets
    }

    async fn gather_search(&self, location: &str) -> Vec<String> {
        let mut snippets = Vec::new();

        for query in search_queries(location) {
            self.limiter.acquire().await;

            match self.search.search(&query).await {
                Ok(hit) => {
                    debug!(query = %query, related = hit.related.len(), "Search query answered");
                    snippets.extend(hit.abstract_text);
                    snippets.extend(hit.related.into_iter().take(MAX_RELATED_TOPICS));
                }
                Err(e) => {
                    warn!(query = %query, error = %e, "Search query failed, skipping");
                }
            }
        }

        snippets
    }

    async fn gather_geodata(&self, bounds: &AreaBounds) -> Vec<String> {
        match self.geodata.facilities(bounds).await {
            Ok(facilities) => facilities.iter().map(Facility::snippet).collect(),
            Err(e) => {
                warn!(error = %e, "Geodata query failed, continuing without it");
                Vec::new()
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::*;
    use super::throttle::{TokenBucket, Unlimited};
    use super::*;
    use crate::error::Error;

    fn bounds() -> AreaBounds {
        AreaBounds::new(40.8, 40.7, -73.9, -74.1).unwrap()
    }

    fn hit(abstract_text: Option<&str>, related: &[&str]) -> SearchHit {
        SearchHit {
            abstract_text: abstract_text.map(String::from),
            related: related.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn facility(name: &str) -> Facility {
        Facility {
            name: name.to_string(),
            amenity: Some("school".to_string()),
            ..Default::default()
        }
    }

    fn aggregator(search: Arc<ScriptedSearch>, geodata: Arc<FixedGeodata>) -> ContentAggregator {
        ContentAggregator::new(search, geodata, Arc::new(Unlimited))
    }

    #[test]
    fn test_search_queries() {
        let queries = search_queries("Austin, Texas");
        assert_eq!(queries.len(), 5);
        assert_eq!(queries[0], "training centers in Austin, Texas");
        assert_eq!(queries[1], "vocational schools Austin, Texas");
    }

    #[test]
    fn test_facility_snippet() {
        assert_eq!(
            facility("ABC Welding School").snippet(),
            "Name: ABC Welding School, Type: school"
        );

        let full = Facility {
            name: "Metro Tech".to_string(),
            operator: Some("City".to_string()),
            amenity: Some("college".to_string()),
            description: Some(" ".to_string()),
            website: Some("https://metro.example".to_string()),
            phone: Some("555-0100".to_string()),
            address: Some("1 Main St, Springfield".to_string()),
        };
        assert_eq!(
            full.snippet(),
            "Name: Metro Tech, Operator: City, Type: college, Website: https://metro.example, Phone: 555-0100, Address: 1 Main St, Springfield"
        );
    }

    #[tokio::test]
    async fn test_gather_orders_search_before_geodata() {
        let search = Arc::new(ScriptedSearch::new(vec![
            Ok(hit(Some("abstract one"), &["r1", "r2", "r3", "r4"])),
            Ok(hit(None, &["r5"])),
        ]));
        let geodata = Arc::new(FixedGeodata::with(vec![facility("A"), facility("B")]));

        let snippets = aggregator(search.clone(), geodata)
            .gather("Springfield", &bounds())
            .await;

        assert_eq!(
            snippets,
            vec![
                "abstract one",
                "r1",
                "r2",
                "r3",
                "r5",
                "Name: A, Type: school",
                "Name: B, Type: school",
            ]
        );
        assert_eq!(search.query_count(), 5);
    }

    #[tokio::test]
    async fn test_failed_query_is_skipped() {
        let search = Arc::new(ScriptedSearch::new(vec![
            Err(Error::Upstream("timeout".to_string())),
            Ok(hit(Some("second"), &[])),
            Err(Error::Upstream("500".to_string())),
            Ok(hit(Some("fourth"), &[])),
        ]));
        let geodata = Arc::new(FixedGeodata::with(Vec::new()));

        let snippets = aggregator(search.clone(), geodata)
            .gather("Springfield", &bounds())
            .await;

        assert_eq!(snippets, vec!["second", "fourth"]);
        assert_eq!(search.query_count(), 5);
    }

    #[tokio::test]
    async fn test_failed_geodata_contributes_nothing() {
        let search = Arc::new(ScriptedSearch::new(vec![Ok(hit(Some("only"), &[]))]));
        let geodata = Arc::new(FixedGeodata::failing());

        let snippets = aggregator(search, geodata.clone())
            .gather("Springfield", &bounds())
            .await;

        assert_eq!(snippets, vec!["only"]);
        assert_eq!(geodata.call_count(), 1);
    }

    #[tokio::test]
    async fn test_nothing_found() {
        let snippets = aggregator(
            Arc::new(ScriptedSearch::silent()),
            Arc::new(FixedGeodata::with(Vec::new())),
        )
        .gather("Nowhere", &bounds())
        .await;
        assert!(snippets.is_empty());
    }

    /// Counts permits instead of sleeping
    #[derive(Default)]
    struct CountingLimiter(std::sync::Mutex<usize>);

    #[async_trait]
    impl RateLimiter for CountingLimiter {
        async fn acquire(&self) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[tokio::test]
    async fn test_limiter_consulted_per_query() {
        let limiter = Arc::new(CountingLimiter::default());
        let aggregator = ContentAggregator::new(
            Arc::new(ScriptedSearch::silent()),
            Arc::new(FixedGeodata::with(Vec::new())),
            limiter.clone(),
        );

        aggregator.gather("Springfield", &bounds()).await;
        assert_eq!(*limiter.0.lock().unwrap(), 5);
    }

    #[tokio::test]
    async fn test_clones_share_limiter() {
        let limiter = Arc::new(CountingLimiter::default());
        let aggregator = ContentAggregator::new(
            Arc::new(ScriptedSearch::silent()),
            Arc::new(FixedGeodata::with(Vec::new())),
            limiter.clone(),
        );
        let other = aggregator.clone();

        aggregator.gather("Springfield", &bounds()).await;
        other.gather("Shelbyville", &bounds()).await;
        assert_eq!(*limiter.0.lock().unwrap(), 10);
    }

    #[tokio::test]
    async fn test_token_bucket_plugs_in() {
        let aggregator = ContentAggregator::new(
            Arc::new(ScriptedSearch::silent()),
            Arc::new(FixedGeodata::with(Vec::new())),
            Arc::new(TokenBucket::per_interval(std::time::Duration::from_millis(1))),
        );
        assert!(aggregator.gather("Springfield", &bounds()).await.is_empty());
    }
}
