//! Company research: every source queried concurrently for one company,
//! each failure collapsed into its own slot.
//!
//! Two stages. The primary stage (website, company search, social profile)
//! always runs. The enrichment stage (company profile, code host, calendar,
//! event search) runs unless the input opts out. Within a stage every lookup
//! settles before the next step; nothing short-circuits on the first error.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, info_span, warn, Instrument};
use typed_builder::TypedBuilder;
use uuid::Uuid;

use nexus_common::{CodeHostProfile, Config, ResearchInput, ResearchResult, SourceResult};

use crate::events::EventScraper;
use crate::scraper::WebScraper;
use crate::sources::github::{code_host_profile, org_login_for_domain};
use crate::sources::proxycurl::domain_of;
use crate::sources::{
    clean_handle, search_company, GitHubClient, LumaCalendar, ProxycurlEnricher, SerpApiSearcher,
    SocialApi, TwitterApi,
};
use crate::traits::{
    CodeHost, CompanyEnricher, EventCalendar, ProfileLookup, Unconfigured, WebSearcher,
};

/// Upcoming calendar events fetched per research call.
pub const CALENDAR_LIMIT: u32 = 20;

/// Every source the orchestrator can query. Missing sources default to
/// `Unconfigured`, which answers `Unavailable` without a network call.
#[derive(Clone, TypedBuilder)]
pub struct ResearchSources {
    pub scraper: WebScraper,
    #[builder(default = Arc::new(Unconfigured("SerpAPI")) as Arc<dyn WebSearcher>)]
    pub searcher: Arc<dyn WebSearcher>,
    #[builder(default = Arc::new(Unconfigured("Twitter")) as Arc<dyn ProfileLookup>)]
    pub profiles: Arc<dyn ProfileLookup>,
    #[builder(default = Arc::new(Unconfigured("Proxycurl")) as Arc<dyn CompanyEnricher>)]
    pub enricher: Arc<dyn CompanyEnricher>,
    #[builder(default = Arc::new(Unconfigured("GitHub")) as Arc<dyn CodeHost>)]
    pub code_host: Arc<dyn CodeHost>,
    #[builder(default = Arc::new(Unconfigured("Luma")) as Arc<dyn EventCalendar>)]
    pub calendar: Arc<dyn EventCalendar>,
}

impl ResearchSources {
    /// Wire real providers for every configured key.
    ///
    /// Social profiles prefer SocialAPI over the official API when both are
    /// configured. The code host works without a token, just rate-limited.
    pub fn from_config(config: &Config) -> Self {
        let searcher: Arc<dyn WebSearcher> = match &config.serpapi_api_key {
            Some(key) => Arc::new(SerpApiSearcher::new(key, &config.serpapi_base_url)),
            None => Arc::new(Unconfigured("SerpAPI")),
        };

        let profiles: Arc<dyn ProfileLookup> = if let Some(social) = SocialApi::from_config(config) {
            Arc::new(social)
        } else if let Some(token) = &config.twitter_bearer_token {
            Arc::new(TwitterApi::new(token, &config.twitter_api_url))
        } else {
            Arc::new(Unconfigured("Twitter"))
        };

        let enricher: Arc<dyn CompanyEnricher> = match &config.proxycurl_api_key {
            Some(key) => Arc::new(ProxycurlEnricher::new(key, &config.proxycurl_base_url)),
            None => Arc::new(Unconfigured("Proxycurl")),
        };

        let calendar: Arc<dyn EventCalendar> = match &config.luma_api_key {
            Some(key) => Arc::new(LumaCalendar::new(key, &config.luma_api_url)),
            None => Arc::new(Unconfigured("Luma")),
        };

        let code_host = Arc::new(GitHubClient::new(
            config.github_token.as_deref(),
            &config.github_api_url,
        ));

        Self::builder()
            .scraper(WebScraper::from_config(config))
            .searcher(searcher)
            .profiles(profiles)
            .enricher(enricher)
            .code_host(code_host)
            .calendar(calendar)
            .build()
    }
}

/// Collapse one source's outcome into its slot. Unconfigured sources stay
/// silent; anything else is logged and recorded as `"<label>: <error>"`.
fn settle<T: Default>(label: &str, outcome: SourceResult<T>, errors: &mut Vec<String>) -> T {
    match outcome {
        Ok(value) => value,
        Err(e) => {
            if e.is_failure() {
                warn!(source = label, error = %e, "Research source failed");
                errors.push(format!("{label}: {e}"));
            }
            T::default()
        }
    }
}

#[derive(Clone)]
pub struct Researcher {
    sources: ResearchSources,
    events: EventScraper,
}

impl Researcher {
    pub fn new(sources: ResearchSources) -> Self {
        let events = EventScraper::new(sources.scraper.clone(), sources.searcher.clone());
        Self { sources, events }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(ResearchSources::from_config(config))
    }

    pub fn events(&self) -> &EventScraper {
        &self.events
    }

    pub fn sources(&self) -> &ResearchSources {
        &self.sources
    }

    /// Research one company. Never fails: every source that errored leaves
    /// its field empty and adds an entry to `errors`.
    pub async fn research_company(&self, input: &ResearchInput) -> ResearchResult {
        let run_id = Uuid::new_v4();
        let span = info_span!("research_company", %run_id, company = input.name.trim());
        self.run(input).instrument(span).await
    }

    async fn run(&self, input: &ResearchInput) -> ResearchResult {
        let name = input.name.trim();
        let website = input
            .website
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty());
        let handle = input
            .twitter_handle
            .as_deref()
            .map(clean_handle)
            .filter(|h| !h.is_empty());

        info!(
            website = website.is_some(),
            handle = handle.is_some(),
            enrich = input.should_enrich(),
            "Research started"
        );

        let mut errors = Vec::new();

        let (website_page, google, twitter) = tokio::join!(
            async {
                match website {
                    Some(url) => self.sources.scraper.try_scrape(url).await.map(Some),
                    None => Ok(None),
                }
            },
            search_company(self.sources.searcher.as_ref(), name),
            async {
                match handle {
                    Some(handle) => self.sources.profiles.profile(handle).await.map(Some),
                    None => Ok(None),
                }
            },
        );

        let mut result = ResearchResult {
            website: settle("Website", website_page, &mut errors),
            google: settle("Google", google, &mut errors),
            twitter: settle("Twitter", twitter, &mut errors),
            ..Default::default()
        };

        if input.should_enrich() {
            let domain = website.map(domain_of).filter(|d| !d.is_empty());
            let login = domain.as_deref().and_then(org_login_for_domain);

            let (proxycurl, github, luma, luma_scraped) = tokio::join!(
                async {
                    match &domain {
                        Some(domain) => self.sources.enricher.enrich(domain).await,
                        None => Ok(None),
                    }
                },
                async {
                    match login {
                        Some(login) => code_host_profile(self.sources.code_host.as_ref(), login).await,
                        None => Ok(CodeHostProfile::default()),
                    }
                },
                self.sources.calendar.upcoming(Utc::now(), CALENDAR_LIMIT),
                self.events.events_for_company(name),
            );

            result.proxycurl = settle("Proxycurl", proxycurl, &mut errors);
            result.github = settle("GitHub", github, &mut errors);
            result.luma = settle("Luma", luma, &mut errors);
            result.luma_scraped = settle("LumaScraped", luma_scraped, &mut errors);
        }

        result.errors = errors;
        info!(
            google = result.google.len(),
            events = result.luma_scraped.len(),
            errors = result.errors.len(),
            "Research complete"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::DateTime;
    use nexus_common::{
        CalendarEvent, CompanyProfile, GitHubOrg, GitHubRepo, SearchResult, SourceError,
        TwitterProfile, TwitterResult,
    };

    use crate::events::event_queries;
    use crate::testing::{
        calendar_event, page, search_hit, MockCalendar, MockCodeHost, MockEnricher, MockProfiles,
        MockScraper, MockSearcher,
    };

    /// Every call fails with a network error.
    struct Down;

    fn down<T>() -> SourceResult<T> {
        Err(SourceError::Network("connection refused".into()))
    }

    #[async_trait]
    impl WebSearcher for Down {
        async fn search(&self, _query: &str) -> SourceResult<Vec<SearchResult>> {
            down()
        }
    }

    #[async_trait]
    impl ProfileLookup for Down {
        async fn profile(&self, _handle: &str) -> SourceResult<TwitterResult> {
            down()
        }

        fn name(&self) -> &str {
            "down"
        }
    }

    #[async_trait]
    impl CompanyEnricher for Down {
        async fn enrich(&self, _domain: &str) -> SourceResult<Option<CompanyProfile>> {
            down()
        }
    }

    #[async_trait]
    impl CodeHost for Down {
        async fn org(&self, _login: &str) -> SourceResult<Option<GitHubOrg>> {
            down()
        }

        async fn repos(&self, _login: &str) -> SourceResult<Vec<GitHubRepo>> {
            down()
        }
    }

    #[async_trait]
    impl EventCalendar for Down {
        async fn upcoming(&self, _after: DateTime<Utc>, _limit: u32) -> SourceResult<Vec<CalendarEvent>> {
            down()
        }
    }

    fn reader_only(reader: Arc<MockScraper>) -> WebScraper {
        WebScraper::new(None, reader)
    }

    fn labels(errors: &[String]) -> Vec<&str> {
        errors
            .iter()
            .filter_map(|e| e.split(':').next())
            .collect()
    }

    #[tokio::test]
    async fn name_only_with_nothing_configured_is_empty_and_quiet() {
        let reader = Arc::new(MockScraper::new());
        let researcher = Researcher::new(
            ResearchSources::builder()
                .scraper(reader_only(reader.clone()))
                .build(),
        );

        let result = researcher
            .research_company(&ResearchInput::builder().name("Acme").build())
            .await;

        assert_eq!(result, ResearchResult::default());
        assert!(reader.calls().is_empty());
    }

    #[tokio::test]
    async fn search_only_populates_google() {
        let mut searcher = MockSearcher::new()
            .on_query(
                "Acme company overview funding",
                vec![search_hit("https://acme.com", "Acme")],
            )
            .on_query(
                "Acme web3 sponsorship event partnership",
                vec![search_hit("https://news.com/acme", "Acme sponsors")],
            );
        for query in event_queries("Acme") {
            searcher = searcher.on_query(&query, vec![]);
        }
        let code_host = Arc::new(MockCodeHost::new());
        let researcher = Researcher::new(
            ResearchSources::builder()
                .scraper(reader_only(Arc::new(MockScraper::new())))
                .searcher(Arc::new(searcher))
                .code_host(code_host.clone())
                .build(),
        );

        let result = researcher
            .research_company(&ResearchInput::builder().name("Acme").build())
            .await;

        assert_eq!(result.google.len(), 2);
        assert!(result.website.is_none());
        assert!(result.twitter.is_none());
        assert!(result.proxycurl.is_none());
        assert_eq!(result.github, CodeHostProfile::default());
        assert!(result.luma.is_empty());
        assert!(result.luma_scraped.is_empty());
        assert!(result.errors.is_empty());
        assert!(code_host.org_calls().is_empty());
    }

    #[tokio::test]
    async fn every_source_failing_still_returns_a_result() {
        let reader = Arc::new(MockScraper::new().failing_with(SourceError::Status {
            status: 503,
            message: "unavailable".into(),
        }));
        let researcher = Researcher::new(
            ResearchSources::builder()
                .scraper(reader_only(reader))
                .searcher(Arc::new(Down))
                .profiles(Arc::new(Down))
                .enricher(Arc::new(Down))
                .code_host(Arc::new(Down))
                .calendar(Arc::new(Down))
                .build(),
        );
        let input = ResearchInput::builder()
            .name("Acme")
            .website("https://acme.xyz")
            .twitter_handle("@acme")
            .build();

        let result = researcher.research_company(&input).await;

        assert_eq!(
            labels(&result.errors),
            vec!["Website", "Google", "Twitter", "Proxycurl", "GitHub", "Luma", "LumaScraped"]
        );
        assert!(result.errors[0].contains("503"));
        assert!(result.website.is_none());
        assert!(result.google.is_empty());
        assert_eq!(result.github, CodeHostProfile::default());
    }

    #[tokio::test]
    async fn full_research_fills_every_slot() {
        let reader = Arc::new(MockScraper::new().on_page(
            "https://acme.xyz/about",
            page("# Acme\nWe build things", "Acme"),
        ));
        let profiles = Arc::new(MockProfiles::new().on_handle(
            "acme",
            TwitterResult {
                profile: TwitterProfile {
                    username: Some("acme".into()),
                    ..Default::default()
                },
                tweets: vec![],
            },
        ));
        let enricher = Arc::new(MockEnricher::new().on_domain(
            "acme.xyz",
            CompanyProfile {
                name: Some("Acme Inc".into()),
                ..Default::default()
            },
        ));
        let code_host = Arc::new(MockCodeHost::new().on_org(
            "acme",
            GitHubOrg {
                login: "acme".into(),
                ..Default::default()
            },
            vec![GitHubRepo {
                name: "core".into(),
                ..Default::default()
            }],
        ));
        let calendar = Arc::new(MockCalendar::new().with_events(vec![calendar_event("evt-1", "Acme Summit")]));

        let researcher = Researcher::new(
            ResearchSources::builder()
                .scraper(reader_only(reader))
                .profiles(profiles.clone())
                .enricher(enricher.clone())
                .code_host(code_host)
                .calendar(calendar.clone())
                .build(),
        );
        let input = ResearchInput::builder()
            .name("Acme")
            .website("https://acme.xyz/about")
            .twitter_handle(" @acme ")
            .build();

        let result = researcher.research_company(&input).await;

        assert_eq!(result.website.unwrap().title, "Acme");
        assert_eq!(result.twitter.unwrap().profile.username.as_deref(), Some("acme"));
        assert_eq!(result.proxycurl.unwrap().name.as_deref(), Some("Acme Inc"));
        assert_eq!(result.github.repos[0].name, "core");
        assert_eq!(result.luma.len(), 1);
        assert!(result.errors.is_empty());
        assert_eq!(profiles.calls(), vec!["acme"]);
        assert_eq!(enricher.calls(), vec!["acme.xyz"]);
        assert_eq!(calendar.calls()[0].1, CALENDAR_LIMIT);
    }

    #[tokio::test]
    async fn enrich_false_skips_the_second_stage() {
        let enricher = Arc::new(MockEnricher::new());
        let calendar = Arc::new(MockCalendar::new());
        let researcher = Researcher::new(
            ResearchSources::builder()
                .scraper(reader_only(Arc::new(MockScraper::new().on_page(
                    "https://acme.xyz",
                    page("hello", ""),
                ))))
                .enricher(enricher.clone())
                .calendar(calendar.clone())
                .build(),
        );
        let input = ResearchInput::builder()
            .name("Acme")
            .website("acme.xyz")
            .enrich(false)
            .build();

        let result = researcher.research_company(&input).await;

        assert_eq!(result.website.unwrap().content, "hello");
        assert!(enricher.calls().is_empty());
        assert!(calendar.calls().is_empty());
    }
}
