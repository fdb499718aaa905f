//! DuckDuckGo Instant Answer search source
//!
//! Free, keyless. Only the abstract and the flat related topics are used.

use crate::constants::api::{DUCKDUCKGO_URL, USER_AGENT};
use crate::error::{Error, Result};
use crate::sources::{SearchHit, SearchSource};
use async_trait::async_trait;
use serde::Deserialize;

/// DuckDuckGo search backend
#[derive(Debug, Clone)]
pub struct DuckDuckGoSource {
    client: reqwest::Client,
    base_url: String,
}

/// Instant Answer response (only the fields we read)
#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

/// Either a topic with text or a named group of topics
#[derive(Debug, Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text", default)]
    text: Option<String>,
}

impl DuckDuckGoSource {
    /// Create a new DuckDuckGo source
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: DUCKDUCKGO_URL.to_string(),
        })
    }

    /// Point the source at a different endpoint
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn query_url(&self, query: &str) -> String {
        format!(
            "{}/?q={}&format=json&no_html=1&skip_disambig=1",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    fn parse_answer(body: &str) -> Result<SearchHit> {
        let answer: InstantAnswer = serde_json::from_str(body)
            .map_err(|e| Error::Upstream(format!("Failed to parse DuckDuckGo response: {}", e)))?;

        let abstract_text = Some(answer.abstract_text.trim().to_string()).filter(|s| !s.is_empty());
        let related = answer
            .related_topics
            .into_iter()
            .filter_map(|t| t.text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Ok(SearchHit {
            abstract_text,
            related,
        })
    }
}

#[async_trait]
impl SearchSource for DuckDuckGoSource {
    async fn search(&self, query: &str) -> Result<SearchHit> {
        let response = self
            .client
            .get(self.query_url(query))
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("DuckDuckGo request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Upstream(format!(
                "DuckDuckGo returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("DuckDuckGo response unreadable: {}", e)))?;
        Self::parse_answer(&body)
    }
}
