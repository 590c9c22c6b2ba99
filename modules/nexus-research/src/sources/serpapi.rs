use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use nexus_common::fetch::{fetch_json, LOOKUP_TIMEOUT};
use nexus_common::{SearchResult, SourceResult};

use crate::traits::WebSearcher;

const RESULTS_PER_QUERY: &str = "10";

/// Google organic results through SerpAPI.
pub struct SerpApiSearcher {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<SearchResult>,
}

impl SerpApiSearcher {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl WebSearcher for SerpApiSearcher {
    async fn search(&self, query: &str) -> SourceResult<Vec<SearchResult>> {
        debug!(query, "SerpAPI search");

        let request = self.client.get(format!("{}/search", self.base_url)).query(&[
            ("q", query),
            ("api_key", self.api_key.as_str()),
            ("num", RESULTS_PER_QUERY),
        ]);
        let data: SerpResponse = fetch_json(request, LOOKUP_TIMEOUT).await?;

        info!(query, count = data.organic_results.len(), "SerpAPI search complete");
        Ok(data.organic_results)
    }
}
