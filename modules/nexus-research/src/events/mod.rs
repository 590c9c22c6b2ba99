//! Event discovery on lu.ma / luma.com.
//!
//! Two entry points:
//! - [`EventScraper::events_for_company`] finds event pages through web search
//!   and keeps only events from the trailing twelve months (undated events
//!   stay in).
//! - [`EventScraper::events_from_urls`] expands caller-supplied calendar or
//!   event URLs into events, with no recency window.

pub mod dates;
pub mod extract;
pub mod links;

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};

use nexus_common::fetch::EVENT_SCRAPE_TIMEOUT;
use nexus_common::{normalize_event_url, ScrapeResult, ScrapedEvent, SearchResult, SourceResult};

use crate::scraper::WebScraper;
use crate::traits::WebSearcher;
use dates::{extract_date, within_last_year};
use extract::{extract_description, extract_title, placeholder_title, truncate_chars};
use links::{discover_event_links, is_event_host_url, last_path_segment};

const EVENT_HOST_BASE: &str = "https://lu.ma/";
const MAX_TITLE_CHARS: usize = 500;
const MAX_DESCRIPTION_CHARS: usize = 2000;

/// Search queries that surface a company's event pages.
pub fn event_queries(company: &str) -> [String; 3] {
    [
        format!("\"{company}\" hackathon site:lu.ma"),
        format!("\"{company}\" event OR meetup site:lu.ma"),
        format!("{company} lu.ma events"),
    ]
}

/// Guessed calendar URL for a company: `https://lu.ma/<slug>`, where the
/// slug is the lowercased name with whitespace removed and anything outside
/// `[a-z0-9-]` dropped.
pub fn calendar_url_for_company(company: &str) -> Option<String> {
    let slug: String = company
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();
    (!slug.is_empty()).then(|| format!("{EVENT_HOST_BASE}{slug}"))
}

/// One bare event per URL, titled from the URL itself.
pub fn placeholder_events(urls: &[String]) -> Vec<ScrapedEvent> {
    urls.iter()
        .map(|url| ScrapedEvent::bare(url.clone(), placeholder_title(url)))
        .collect()
}

/// Newest first, undated events last. Stable for ties.
pub fn sort_newest_first(events: &mut [ScrapedEvent]) {
    events.sort_by(|a, b| match (a.start_at, b.start_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Build an event from one scraped page.
fn event_from_page(url: &str, content: &str, fallback_title: &str) -> ScrapedEvent {
    let parsed = extract_date(content);
    ScrapedEvent {
        title: extract_title(content, fallback_title),
        url: url.to_string(),
        date: parsed.as_ref().map(|d| d.date.clone()),
        start_at: parsed.map(|d| d.start_at),
        description: extract_description(content),
        snippet: None,
        organizer: None,
    }
}

#[derive(Clone)]
pub struct EventScraper {
    scraper: WebScraper,
    searcher: Arc<dyn WebSearcher>,
    page_timeout: Duration,
}

impl EventScraper {
    pub fn new(scraper: WebScraper, searcher: Arc<dyn WebSearcher>) -> Self {
        Self {
            scraper,
            searcher,
            page_timeout: EVENT_SCRAPE_TIMEOUT,
        }
    }

    /// Per-provider limit for each event page scrape.
    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    async fn scrape_page(&self, url: &str) -> SourceResult<ScrapeResult> {
        self.scraper.try_scrape_within(url, self.page_timeout).await
    }

    /// Events found by searching for the company name, relative to the
    /// current time.
    pub async fn events_for_company(&self, company: &str) -> SourceResult<Vec<ScrapedEvent>> {
        self.events_for_company_at(company, Utc::now()).await
    }

    /// Events found by searching for the company name. Dated events outside
    /// `[now - 12 months, now]` are dropped. Fails only when every search
    /// query failed.
    pub async fn events_for_company_at(
        &self,
        company: &str,
        now: DateTime<Utc>,
    ) -> SourceResult<Vec<ScrapedEvent>> {
        let company = company.trim();
        if company.is_empty() {
            return Ok(Vec::new());
        }

        let queries = event_queries(company);
        let outcomes = join_all(queries.iter().map(|q| self.searcher.search(q))).await;

        let mut hits: Vec<SearchResult> = Vec::new();
        let mut first_error = None;
        let mut any_ok = false;
        for (query, outcome) in queries.iter().zip(outcomes) {
            match outcome {
                Ok(results) => {
                    any_ok = true;
                    hits.extend(results);
                }
                Err(e) => {
                    if e.is_failure() {
                        warn!(query = query.as_str(), error = %e, "Event search query failed");
                    }
                    first_error.get_or_insert(e);
                }
            }
        }
        if let (false, Some(e)) = (any_ok, first_error) {
            return Err(e);
        }

        let mut seen = HashSet::new();
        let hits: Vec<SearchResult> = hits
            .into_iter()
            .filter(|h| is_event_host_url(&h.link) && seen.insert(h.link.clone()))
            .collect();
        debug!(company, count = hits.len(), "Event pages found by search");

        let pages = join_all(hits.iter().map(|h| self.scrape_page(&h.link))).await;

        let mut events: Vec<ScrapedEvent> = hits
            .iter()
            .zip(pages)
            .filter_map(|(hit, page)| {
                let content = match page {
                    Ok(page) => page.content,
                    Err(e) => {
                        warn!(url = hit.link.as_str(), error = %e, "Event page scrape failed");
                        String::new()
                    }
                };
                let mut event = event_from_page(&hit.link, &content, &hit.title);
                if event.start_at.is_some_and(|at| !within_last_year(at, now)) {
                    return None;
                }
                event.snippet = (!hit.snippet.is_empty()).then(|| hit.snippet.clone());
                Some(event)
            })
            .collect();

        sort_newest_first(&mut events);
        info!(company, count = events.len(), "Events by company search");
        Ok(events)
    }

    /// Events from calendar or event URLs the caller already knows. Listing
    /// pages expand into the event links they contain; a page with no event
    /// links counts as an event itself.
    pub async fn events_from_urls(&self, company: &str, urls: &[String]) -> Vec<ScrapedEvent> {
        if company.trim().is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let roots: Vec<&str> = urls
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty() && is_event_host_url(u))
            .filter(|u| seen.insert(normalize_event_url(u)))
            .collect();

        let listings = join_all(roots.iter().map(|u| self.scrape_page(u))).await;

        // A root with no sub-links is an event page itself; its scrape is reused.
        let mut targets: Vec<(String, Option<SourceResult<ScrapeResult>>)> = Vec::new();
        for (root, listing) in roots.iter().zip(listings) {
            let page = match listing {
                Ok(page) => page,
                Err(e) => {
                    warn!(url = *root, error = %e, "Event listing scrape failed");
                    targets.push((root.to_string(), Some(Err(e))));
                    continue;
                }
            };
            let sub_links = discover_event_links(&page.content, root);
            if sub_links.is_empty() {
                targets.push((root.to_string(), Some(Ok(page))));
                continue;
            }
            for link in sub_links {
                if seen.insert(normalize_event_url(&link)) {
                    targets.push((link, None));
                }
            }
        }

        let pages = join_all(targets.into_iter().map(|(url, known)| async move {
            let page = match known {
                Some(page) => page,
                None => self.scrape_page(&url).await,
            };
            (url, page)
        }))
        .await;

        let mut events: Vec<ScrapedEvent> = pages
            .into_iter()
            .map(|(url, page)| {
                let slug = last_path_segment(&url).unwrap_or_else(|| "Event".to_string());
                match page {
                    Ok(page) => {
                        let fallback = if page.title.is_empty() { slug } else { page.title };
                        let mut event = event_from_page(&url, &page.content, &fallback);
                        event.title = truncate_chars(&event.title, MAX_TITLE_CHARS);
                        event.description =
                            event.description.map(|d| truncate_chars(&d, MAX_DESCRIPTION_CHARS));
                        event
                    }
                    Err(e) => {
                        warn!(url = url.as_str(), error = %e, "Event page scrape failed");
                        ScrapedEvent::bare(url, slug)
                    }
                }
            })
            .collect();

        sort_newest_first(&mut events);
        info!(company, count = events.len(), "Events from URLs");
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{page, search_hit, MockScraper, MockSearcher};
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap())
    }

    #[test]
    fn slug_from_company_name() {
        assert_eq!(calendar_url_for_company("Polygon Labs").as_deref(), Some("https://lu.ma/polygonlabs"));
        assert_eq!(calendar_url_for_company(" Eigen-Layer! ").as_deref(), Some("https://lu.ma/eigen-layer"));
        assert_eq!(calendar_url_for_company("!!!"), None);
        assert_eq!(calendar_url_for_company("   "), None);
    }

    #[test]
    fn queries_quote_the_name() {
        let q = event_queries("Acme");
        assert_eq!(q[0], "\"Acme\" hackathon site:lu.ma");
        assert_eq!(q[1], "\"Acme\" event OR meetup site:lu.ma");
        assert_eq!(q[2], "Acme lu.ma events");
    }

    #[test]
    fn sort_puts_undated_last() {
        let mut events = vec![
            ScrapedEvent { start_at: None, ..ScrapedEvent::bare("https://lu.ma/a", "a") },
            ScrapedEvent { start_at: at(2025, 1, 1), ..ScrapedEvent::bare("https://lu.ma/b", "b") },
            ScrapedEvent { start_at: at(2025, 3, 1), ..ScrapedEvent::bare("https://lu.ma/c", "c") },
        ];
        sort_newest_first(&mut events);
        let order: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn placeholders_one_per_url() {
        let events = placeholder_events(&["https://lu.ma/acme-labs".to_string()]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "acme labs");
        assert!(events[0].start_at.is_none());
    }

    #[test]
    fn page_parsing_uses_fallback_title() {
        let event = event_from_page("https://lu.ma/x", "", "From Search");
        assert_eq!(event.title, "From Search");
        assert!(event.date.is_none());
    }

    fn scraper_with(reader: Arc<MockScraper>, searcher: MockSearcher) -> EventScraper {
        EventScraper::new(WebScraper::new(None, reader), Arc::new(searcher))
    }

    #[tokio::test]
    async fn company_search_filters_sorts_and_keeps_undated() {
        let [hackathon_q, meetup_q, _] = event_queries("Acme");
        let mut undated = search_hit("https://lu.ma/undated", "Undated Meetup");
        undated.snippet = "join us".into();
        let searcher = MockSearcher::new()
            .on_query(
                &hackathon_q,
                vec![
                    search_hit("https://lu.ma/old", "Old"),
                    search_hit("https://example.com/not-an-event", "Elsewhere"),
                    search_hit("https://lu.ma/recent", "Recent (search)"),
                ],
            )
            .on_query(
                &meetup_q,
                vec![search_hit("https://lu.ma/recent", "Recent again"), undated],
            );
        let reader = Arc::new(
            MockScraper::new()
                .on_page("https://lu.ma/recent", page("# Recent Hack\nMarch 8, 2025", ""))
                .on_page("https://lu.ma/old", page("# Old Summit\n2023-01-01", "")),
        );
        let events = scraper_with(reader.clone(), searcher)
            .events_for_company_at("Acme", at(2025, 6, 15).unwrap())
            .await
            .unwrap();

        let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Recent Hack", "Undated Meetup"]);
        assert_eq!(events[0].date.as_deref(), Some("2025-03-08"));
        assert_eq!(events[1].snippet.as_deref(), Some("join us"));
        assert!(events[1].start_at.is_none());
        assert_eq!(reader.calls().len(), 3);
    }

    #[tokio::test]
    async fn company_search_fails_only_when_every_query_fails() {
        let reader = Arc::new(MockScraper::new());
        let result = scraper_with(reader.clone(), MockSearcher::new())
            .events_for_company("Acme")
            .await;
        assert!(result.is_err());
        assert!(reader.calls().is_empty());
    }

    #[tokio::test]
    async fn blank_company_short_circuits() {
        let searcher = MockSearcher::new();
        let scraper = EventScraper::new(
            WebScraper::new(None, Arc::new(MockScraper::new())),
            Arc::new(searcher),
        );
        assert!(scraper.events_for_company("  ").await.unwrap().is_empty());
        assert!(scraper.events_from_urls(" ", &["https://lu.ma/x".into()]).await.is_empty());
    }

    #[tokio::test]
    async fn explicit_urls_expand_listings_without_a_window() {
        let reader = Arc::new(
            MockScraper::new()
                .on_page(
                    "https://lu.ma/acme",
                    page("Upcoming https://lu.ma/hack-one and [Two](https://lu.ma/hack-two)", "Acme"),
                )
                .on_page("https://lu.ma/hack-one", page("# Hack One\nStarts 2020-01-05T10:00Z", "")),
        );
        let urls = vec![
            "https://lu.ma/acme".to_string(),
            "https://lu.ma/acme/".to_string(),
            "https://example.com/x".to_string(),
        ];
        let events = scraper_with(reader.clone(), MockSearcher::new())
            .events_from_urls("Acme", &urls)
            .await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "Hack One");
        assert_eq!(events[0].date.as_deref(), Some("2020-01-05"));
        assert_eq!(events[1].title, "hack-two");
        assert_eq!(events[1].url, "https://lu.ma/hack-two");
        assert_eq!(
            reader.calls(),
            vec!["https://lu.ma/acme", "https://lu.ma/hack-one", "https://lu.ma/hack-two"]
        );
    }

    #[tokio::test]
    async fn slow_primary_still_leaves_the_reader_its_full_time() {
        let primary = Arc::new(
            MockScraper::new()
                .with_delay(Duration::from_millis(150))
                .failing_with(nexus_common::SourceError::Status {
                    status: 500,
                    message: "upstream".into(),
                }),
        );
        let reader = Arc::new(
            MockScraper::new()
                .with_delay(Duration::from_millis(100))
                .on_page("https://lu.ma/acme-demo", page("# Acme Demo Day\nJan 15, 2026", "")),
        );
        let events = EventScraper::new(WebScraper::new(Some(primary), reader), Arc::new(MockSearcher::new()))
            .with_page_timeout(Duration::from_millis(200))
            .events_from_urls("Acme", &["https://lu.ma/acme-demo".to_string()])
            .await;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Acme Demo Day");
        assert_eq!(events[0].date.as_deref(), Some("2026-01-15"));
    }

    #[tokio::test]
    async fn page_without_links_is_its_own_event() {
        let long_title = "T".repeat(600);
        let reader = Arc::new(MockScraper::new().on_page(
            "https://lu.ma/solo",
            page(&format!("{long_title}\nDetails: {}", "d".repeat(400)), &long_title),
        ));
        let events = scraper_with(reader.clone(), MockSearcher::new())
            .events_from_urls("Acme", &["https://lu.ma/solo".to_string()])
            .await;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].url, "https://lu.ma/solo");
        assert_eq!(events[0].title.chars().count(), 500);
        assert_eq!(events[0].description.as_deref().map(str::len), Some(400));
        assert_eq!(reader.calls().len(), 1);
    }
}
