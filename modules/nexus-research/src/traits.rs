// Trait seams for every external source the research core talks to.
//
// Each adapter returns `SourceResult`; callers decide whether a failure is
// recorded or collapsed. `Unconfigured` stands in for any source whose key is
// missing and answers `SourceError::Unavailable` without touching the network.
// It also stands in for a missing LLM key.
//
// Mocks for all of these live in `testing.rs`.

use ai_client::{AiError, ChatModel, Message};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use nexus_common::{
    CalendarEvent, CompanyProfile, GitHubOrg, GitHubRepo, ScrapeResult, SearchResult,
    SocialSearchResult, SourceError, SourceResult, TwitterResult,
};

// ---------------------------------------------------------------------------
// Page scraping
// ---------------------------------------------------------------------------

#[async_trait]
pub trait PageScraper: Send + Sync {
    /// Render a URL to markdown. The URL already carries a scheme.
    async fn scrape(&self, url: &str) -> SourceResult<ScrapeResult>;
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Organic results for one query, in provider order.
    async fn search(&self, query: &str) -> SourceResult<Vec<SearchResult>>;
}

#[async_trait]
pub trait SocialSearcher: Send + Sync {
    /// Keyword search over recent social posts.
    async fn search_posts(&self, query: &str) -> SourceResult<Vec<SocialSearchResult>>;
}

// ---------------------------------------------------------------------------
// Profiles and enrichment
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ProfileLookup: Send + Sync {
    /// Profile and recent posts for a handle. The handle has no leading `@`.
    async fn profile(&self, handle: &str) -> SourceResult<TwitterResult>;
    fn name(&self) -> &str;
}

#[async_trait]
pub trait CompanyEnricher: Send + Sync {
    /// `Ok(None)` when the provider knows no company for the domain.
    async fn enrich(&self, domain: &str) -> SourceResult<Option<CompanyProfile>>;
}

#[async_trait]
pub trait CodeHost: Send + Sync {
    /// `Ok(None)` when no org exists under that login.
    async fn org(&self, login: &str) -> SourceResult<Option<GitHubOrg>>;
    async fn repos(&self, login: &str) -> SourceResult<Vec<GitHubRepo>>;
}

#[async_trait]
pub trait EventCalendar: Send + Sync {
    async fn upcoming(&self, after: DateTime<Utc>, limit: u32) -> SourceResult<Vec<CalendarEvent>>;
}

// ---------------------------------------------------------------------------
// Unconfigured
// ---------------------------------------------------------------------------

/// A source with no key. Every call answers `Unavailable(name)`.
#[derive(Debug, Clone, Copy)]
pub struct Unconfigured(pub &'static str);

impl Unconfigured {
    fn err<T>(&self) -> SourceResult<T> {
        Err(SourceError::Unavailable(self.0))
    }
}

#[async_trait]
impl WebSearcher for Unconfigured {
    async fn search(&self, _query: &str) -> SourceResult<Vec<SearchResult>> {
        self.err()
    }
}

#[async_trait]
impl SocialSearcher for Unconfigured {
    async fn search_posts(&self, _query: &str) -> SourceResult<Vec<SocialSearchResult>> {
        self.err()
    }
}

#[async_trait]
impl ProfileLookup for Unconfigured {
    async fn profile(&self, _handle: &str) -> SourceResult<TwitterResult> {
        self.err()
    }

    fn name(&self) -> &str {
        self.0
    }
}

#[async_trait]
impl CompanyEnricher for Unconfigured {
    async fn enrich(&self, _domain: &str) -> SourceResult<Option<CompanyProfile>> {
        self.err()
    }
}

#[async_trait]
impl CodeHost for Unconfigured {
    async fn org(&self, _login: &str) -> SourceResult<Option<GitHubOrg>> {
        self.err()
    }

    async fn repos(&self, _login: &str) -> SourceResult<Vec<GitHubRepo>> {
        self.err()
    }
}

#[async_trait]
impl EventCalendar for Unconfigured {
    async fn upcoming(&self, _after: DateTime<Utc>, _limit: u32) -> SourceResult<Vec<CalendarEvent>> {
        self.err()
    }
}

#[async_trait]
impl ChatModel for Unconfigured {
    async fn chat(&self, _messages: &[Message]) -> ai_client::Result<String> {
        Err(AiError::Network(format!("{} is not configured", self.0)))
    }
}
