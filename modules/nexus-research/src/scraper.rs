use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::{info, warn};

use firecrawl_client::{FirecrawlClient, FirecrawlError};
use nexus_common::fetch::{bounded, fetch_text, LOOKUP_TIMEOUT};
use nexus_common::{Config, ScrapeResult, SourceError, SourceResult};

use crate::traits::PageScraper;

static RE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").expect("valid regex"));

/// Prefix `https://` when the URL has no scheme.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Text of the first top-level `# ` heading line, trimmed.
pub fn first_heading(markdown: &str) -> Option<String> {
    RE_HEADING
        .captures(markdown)
        .map(|c| c[1].trim().to_string())
}

// --- Firecrawl ---

pub struct FirecrawlScraper {
    client: FirecrawlClient,
}

impl FirecrawlScraper {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            client: FirecrawlClient::with_base_url(api_key, base_url),
        }
    }
}

fn firecrawl_error(err: FirecrawlError) -> SourceError {
    match err {
        FirecrawlError::Network(m) => SourceError::Network(m),
        FirecrawlError::Api { status, message } => SourceError::Status { status, message },
        FirecrawlError::Parse(m) => SourceError::Malformed(m),
    }
}

#[async_trait]
impl PageScraper for FirecrawlScraper {
    async fn scrape(&self, url: &str) -> SourceResult<ScrapeResult> {
        let page = bounded(LOOKUP_TIMEOUT, async {
            self.client.scrape(url).await.map_err(firecrawl_error)
        })
        .await?;

        Ok(ScrapeResult {
            content: page.markdown,
            title: page.title,
        })
    }

    fn name(&self) -> &str {
        "firecrawl"
    }
}

// --- Jina Reader ---

/// Reader proxy: GET `<base>/<url>` returns the rendered page as markdown.
pub struct JinaReaderScraper {
    client: reqwest::Client,
    base_url: String,
}

impl JinaReaderScraper {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PageScraper for JinaReaderScraper {
    async fn scrape(&self, url: &str) -> SourceResult<ScrapeResult> {
        let request = self
            .client
            .get(format!("{}/{}", self.base_url, url))
            .header("X-Return-Format", "markdown");
        let text = fetch_text(request, LOOKUP_TIMEOUT).await?;

        Ok(ScrapeResult {
            title: first_heading(&text).unwrap_or_default(),
            content: text,
        })
    }

    fn name(&self) -> &str {
        "jina"
    }
}

// --- Fallback chain ---

async fn attempt(
    scraper: &dyn PageScraper,
    url: &str,
    limit: Option<Duration>,
) -> SourceResult<ScrapeResult> {
    match limit {
        Some(limit) => bounded(limit, scraper.scrape(url)).await,
        None => scraper.scrape(url).await,
    }
}

/// Primary extraction provider (optional) falling back to the reader.
#[derive(Clone)]
pub struct WebScraper {
    primary: Option<Arc<dyn PageScraper>>,
    reader: Arc<dyn PageScraper>,
}

impl WebScraper {
    pub fn new(primary: Option<Arc<dyn PageScraper>>, reader: Arc<dyn PageScraper>) -> Self {
        Self { primary, reader }
    }

    pub fn from_config(config: &Config) -> Self {
        let primary = config.firecrawl_api_key.as_deref().map(|key| {
            Arc::new(FirecrawlScraper::new(key, &config.firecrawl_base_url)) as Arc<dyn PageScraper>
        });
        let reader = Arc::new(JinaReaderScraper::new(&config.jina_reader_url));
        info!(primary = primary.is_some(), "Web scraper configured");
        Self::new(primary, reader)
    }

    /// Walk the chain and return the reader's error if everything failed.
    pub async fn try_scrape(&self, url: &str) -> SourceResult<ScrapeResult> {
        self.walk(url, None).await
    }

    /// Like [`try_scrape`](Self::try_scrape), with `limit` applied to each
    /// provider on its own. A slow primary never eats into the reader's time.
    pub async fn try_scrape_within(&self, url: &str, limit: Duration) -> SourceResult<ScrapeResult> {
        self.walk(url, Some(limit)).await
    }

    async fn walk(&self, url: &str, limit: Option<Duration>) -> SourceResult<ScrapeResult> {
        let url = normalize_url(url);

        if let Some(primary) = &self.primary {
            match attempt(primary.as_ref(), &url, limit).await {
                Ok(page) if !page.content.trim().is_empty() => return Ok(page),
                Ok(_) => warn!(
                    url = url.as_str(),
                    scraper = primary.name(),
                    "Empty content, falling back to reader"
                ),
                Err(e) => warn!(
                    url = url.as_str(),
                    scraper = primary.name(),
                    error = %e,
                    "Primary scrape failed, falling back to reader"
                ),
            }
        }

        match attempt(self.reader.as_ref(), &url, limit).await {
            Ok(page) => Ok(page),
            Err(e) => {
                warn!(url = url.as_str(), scraper = self.reader.name(), error = %e, "Reader scrape failed");
                Err(e)
            }
        }
    }

    /// `None` when every provider failed.
    pub async fn scrape(&self, url: &str) -> Option<ScrapeResult> {
        self.try_scrape(url).await.ok()
    }
}
