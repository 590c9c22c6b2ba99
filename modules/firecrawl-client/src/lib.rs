pub mod error;

pub use error::{FirecrawlError, Result};

use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.firecrawl.dev";

/// A page as rendered by Firecrawl. Either field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirecrawlPage {
    pub markdown: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    data: Option<ScrapeData>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
    content: Option<String>,
    #[serde(default)]
    metadata: Option<ScrapeMetadata>,
}

#[derive(Debug, Deserialize)]
struct ScrapeMetadata {
    title: Option<String>,
}

impl From<ScrapeResponse> for FirecrawlPage {
    fn from(resp: ScrapeResponse) -> Self {
        let Some(data) = resp.data else {
            return FirecrawlPage::default();
        };
        FirecrawlPage {
            markdown: data.markdown.or(data.content).unwrap_or_default(),
            title: data.metadata.and_then(|m| m.title).unwrap_or_default(),
        }
    }
}

pub struct FirecrawlClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FirecrawlClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Render a URL to markdown via the Firecrawl /v1/scrape endpoint.
    ///
    /// No deadline is applied here; callers bound the whole call.
    pub async fn scrape(&self, url: &str) -> Result<FirecrawlPage> {
        let endpoint = format!("{}/v1/scrape", self.base_url);
        let body = serde_json::json!({ "url": url });

        let resp = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(FirecrawlError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = resp.bytes().await?;
        let parsed: ScrapeResponse = serde_json::from_slice(&bytes)?;
        let page = FirecrawlPage::from(parsed);
        tracing::debug!(url, chars = page.markdown.len(), "Firecrawl scrape complete");
        Ok(page)
    }
}
