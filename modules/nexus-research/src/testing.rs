// Test mocks for the research core.
//
// One mock per trait seam in `traits.rs`, plus `MockChatModel` for the LLM:
// - MockScraper (PageScraper): URL → page, or fail every call
// - MockSearcher (WebSearcher): query → results, Err for unregistered queries
// - MockSocialSearcher (SocialSearcher): query → posts, Err for unregistered
// - MockProfiles (ProfileLookup): handle → profile
// - MockEnricher (CompanyEnricher): domain → profile, Ok(None) otherwise
// - MockCodeHost (CodeHost): login → org + repos, Ok(None) otherwise
// - MockCalendar (EventCalendar): fixed event list
// - MockChatModel (ChatModel): queued replies
//
// Every mock records what it was asked for.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use ai_client::{AiError, ChatModel, Message};
use nexus_common::{
    CalendarEvent, CompanyProfile, GitHubOrg, GitHubRepo, ScrapeResult, SearchResult,
    SocialSearchResult, SocialUser, SourceError, SourceResult, TwitterResult,
};

use crate::traits::{
    CodeHost, CompanyEnricher, EventCalendar, PageScraper, ProfileLookup, SocialSearcher,
    WebSearcher,
};

fn not_registered<T>(what: &str, key: &str) -> SourceResult<T> {
    Err(SourceError::Status {
        status: 404,
        message: format!("mock: no {what} registered for {key}"),
    })
}

fn record(log: &Mutex<Vec<String>>, entry: &str) {
    log.lock().unwrap().push(entry.to_string());
}

// ---------------------------------------------------------------------------
// MockScraper
// ---------------------------------------------------------------------------

/// HashMap-based page scraper. Returns `Err` for unregistered URLs.
#[derive(Default)]
pub struct MockScraper {
    pages: HashMap<String, ScrapeResult>,
    failure: Option<SourceError>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockScraper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_page(mut self, url: &str, page: ScrapeResult) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    /// Every call fails with `err`, registered pages or not.
    pub fn failing_with(mut self, err: SourceError) -> Self {
        self.failure = Some(err);
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageScraper for MockScraper {
    async fn scrape(&self, url: &str) -> SourceResult<ScrapeResult> {
        record(&self.calls, url);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        match self.pages.get(url) {
            Some(page) => Ok(page.clone()),
            None => not_registered("page", url),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// MockSearcher
// ---------------------------------------------------------------------------

/// Query-keyed web search. Returns `Err` for unregistered queries.
#[derive(Default)]
pub struct MockSearcher {
    results: HashMap<String, Vec<SearchResult>>,
    queries: Mutex<Vec<String>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_query(mut self, query: &str, results: Vec<SearchResult>) -> Self {
        self.results.insert(query.to_string(), results);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearcher for MockSearcher {
    async fn search(&self, query: &str) -> SourceResult<Vec<SearchResult>> {
        record(&self.queries, query);
        match self.results.get(query) {
            Some(results) => Ok(results.clone()),
            None => not_registered("search", query),
        }
    }
}

// ---------------------------------------------------------------------------
// MockSocialSearcher
// ---------------------------------------------------------------------------

/// Query-keyed social search. Returns `Err` for unregistered queries.
#[derive(Default)]
pub struct MockSocialSearcher {
    posts: HashMap<String, Vec<SocialSearchResult>>,
    queries: Mutex<Vec<String>>,
}

impl MockSocialSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_query(mut self, query: &str, posts: Vec<SocialSearchResult>) -> Self {
        self.posts.insert(query.to_string(), posts);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SocialSearcher for MockSocialSearcher {
    async fn search_posts(&self, query: &str) -> SourceResult<Vec<SocialSearchResult>> {
        record(&self.queries, query);
        match self.posts.get(query) {
            Some(posts) => Ok(posts.clone()),
            None => not_registered("social search", query),
        }
    }
}

// ---------------------------------------------------------------------------
// MockProfiles
// ---------------------------------------------------------------------------

/// Handle-keyed profile lookup. Returns `Err` for unregistered handles.
#[derive(Default)]
pub struct MockProfiles {
    profiles: HashMap<String, TwitterResult>,
    calls: Mutex<Vec<String>>,
}

impl MockProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_handle(mut self, handle: &str, result: TwitterResult) -> Self {
        self.profiles.insert(handle.to_string(), result);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileLookup for MockProfiles {
    async fn profile(&self, handle: &str) -> SourceResult<TwitterResult> {
        record(&self.calls, handle);
        match self.profiles.get(handle) {
            Some(result) => Ok(result.clone()),
            None => not_registered("profile", handle),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// MockEnricher
// ---------------------------------------------------------------------------

/// Domain-keyed company enrichment. Unknown domains resolve to `Ok(None)`.
#[derive(Default)]
pub struct MockEnricher {
    companies: HashMap<String, CompanyProfile>,
    calls: Mutex<Vec<String>>,
}

impl MockEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_domain(mut self, domain: &str, profile: CompanyProfile) -> Self {
        self.companies.insert(domain.to_string(), profile);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompanyEnricher for MockEnricher {
    async fn enrich(&self, domain: &str) -> SourceResult<Option<CompanyProfile>> {
        record(&self.calls, domain);
        Ok(self.companies.get(domain).cloned())
    }
}

// ---------------------------------------------------------------------------
// MockCodeHost
// ---------------------------------------------------------------------------

/// Login-keyed org lookup. Unknown logins resolve to `Ok(None)`.
#[derive(Default)]
pub struct MockCodeHost {
    orgs: HashMap<String, (GitHubOrg, Vec<GitHubRepo>)>,
    org_calls: Mutex<Vec<String>>,
    repo_calls: Mutex<Vec<String>>,
}

impl MockCodeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_org(mut self, login: &str, org: GitHubOrg, repos: Vec<GitHubRepo>) -> Self {
        self.orgs.insert(login.to_string(), (org, repos));
        self
    }

    pub fn org_calls(&self) -> Vec<String> {
        self.org_calls.lock().unwrap().clone()
    }

    pub fn repo_calls(&self) -> usize {
        self.repo_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CodeHost for MockCodeHost {
    async fn org(&self, login: &str) -> SourceResult<Option<GitHubOrg>> {
        record(&self.org_calls, login);
        Ok(self.orgs.get(login).map(|(org, _)| org.clone()))
    }

    async fn repos(&self, login: &str) -> SourceResult<Vec<GitHubRepo>> {
        record(&self.repo_calls, login);
        Ok(self
            .orgs
            .get(login)
            .map(|(_, repos)| repos.clone())
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// MockCalendar
// ---------------------------------------------------------------------------

/// Fixed list of upcoming events, truncated to the requested limit.
#[derive(Default)]
pub struct MockCalendar {
    events: Vec<CalendarEvent>,
    failure: Option<SourceError>,
    calls: Mutex<Vec<(DateTime<Utc>, u32)>>,
}

impl MockCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, events: Vec<CalendarEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn failing_with(mut self, err: SourceError) -> Self {
        self.failure = Some(err);
        self
    }

    pub fn calls(&self) -> Vec<(DateTime<Utc>, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventCalendar for MockCalendar {
    async fn upcoming(&self, after: DateTime<Utc>, limit: u32) -> SourceResult<Vec<CalendarEvent>> {
        self.calls.lock().unwrap().push((after, limit));
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(self.events.iter().take(limit as usize).cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// MockChatModel
// ---------------------------------------------------------------------------

/// Answers with queued replies in order. An empty queue is a network error.
#[derive(Default)]
pub struct MockChatModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl MockChatModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    /// Queue a failed completion.
    pub fn fail(self, message: &str) -> Self {
        self.replies.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    /// Message lists received, one entry per call.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn chat(&self, messages: &[Message]) -> ai_client::Result<String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(AiError::Api {
                status: 500,
                message,
            }),
            None => Err(AiError::Network("mock: no reply queued".to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn search_hit(link: &str, title: &str) -> SearchResult {
    SearchResult {
        title: title.to_string(),
        link: link.to_string(),
        snippet: String::new(),
    }
}

pub fn social_post(text: &str, username: &str) -> SocialSearchResult {
    SocialSearchResult {
        text: text.to_string(),
        user: SocialUser {
            name: username.to_string(),
            username: username.to_string(),
        },
        created_at: None,
    }
}

pub fn page(content: &str, title: &str) -> ScrapeResult {
    ScrapeResult {
        content: content.to_string(),
        title: title.to_string(),
    }
}

pub fn calendar_event(id: &str, name: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        name: Some(name.to_string()),
        ..Default::default()
    }
}
