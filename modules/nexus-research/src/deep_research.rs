//! Multi-round research: search, ask the model for an analysis and follow-up
//! queries, search again, ask for a synthesis.
//!
//! At most two rounds run. Round 2 only happens when round 1 proposed
//! follow-ups and the caller allowed more than one round. Every hand-off to
//! the model is truncated, and a reply that is not JSON degrades to its raw
//! text as the summary.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use ai_client::util::strip_code_fences;
use ai_client::{AiError, ChatModel, Message, OpenRouter};
use nexus_common::fetch::{bounded, LLM_TIMEOUT};
use nexus_common::{
    Config, DeepResearchResult, SearchResult, SocialSearchResult, Source, SourceError, SourceKind,
    SourceResult, TwitterInsights, WebInsights,
};

use crate::dedup::{dedup_by_link, dedup_posts};
use crate::sources::{SerpApiSearcher, SocialApi};
use crate::traits::{SocialSearcher, Unconfigured, WebSearcher};

pub const DEFAULT_ROUNDS: u8 = 2;
pub const MAX_ROUNDS: u8 = 3;
pub const MAX_FOLLOW_UPS: usize = 3;

const ROUND1_WEB: usize = 10;
const ROUND1_SOCIAL: usize = 20;
const FOLLOW_UP_WEB: usize = 8;
const FOLLOW_UP_SOCIAL: usize = 15;
const RESULT_TWEETS: usize = 20;
const RESULT_WEB: usize = 15;

const ANALYSIS_PROMPT: &str = "You are a deep research analyst. Analyze the provided search results and Twitter data about the given query.
Return ONLY valid JSON (no markdown fences) with these fields:
- summary: string (2-3 paragraph comprehensive analysis)
- keyFindings: string[] (5-8 key findings as bullet points)
- twitterInsights: string (summary of what Twitter/social media reveals)
- webInsights: string (summary of what web search reveals)
- followUpQueries: string[] (2-3 follow-up search queries that would deepen understanding)";

const SYNTHESIS_PROMPT: &str = "You are a deep research analyst. You have data from multiple rounds of research on a topic.
Synthesize ALL information into a comprehensive final analysis.
Return ONLY valid JSON (no markdown fences) with:
- summary: string (3-4 paragraph final analysis)
- keyFindings: string[] (8-12 most important findings, deduplicated)
- twitterInsights: string (consolidated social media analysis)
- webInsights: string (consolidated web research analysis)";

/// Rounds to run for a requested maximum: default 2, capped at 3.
pub fn effective_rounds(requested: Option<u8>) -> u8 {
    requested.unwrap_or(DEFAULT_ROUNDS).min(MAX_ROUNDS)
}

/// One parsed model reply. A missing field stays `None` so a synthesis can
/// fall back to the round-1 value field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_findings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_insights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_insights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_queries: Option<Vec<String>>,
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)?.as_str().map(str::to_string)
}

fn string_list(map: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let items = map.get(key)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect(),
    )
}

impl Analysis {
    /// Parse a model reply, tolerating a code fence around the JSON. Text that
    /// is not JSON at all becomes the summary, with empty lists. JSON that is
    /// not an object carries no fields, so every field stays `None`.
    pub fn from_reply(raw: &str) -> Self {
        match serde_json::from_str::<Value>(strip_code_fences(raw)) {
            Ok(Value::Object(map)) => Self {
                summary: string_field(&map, "summary"),
                key_findings: string_list(&map, "keyFindings"),
                twitter_insights: string_field(&map, "twitterInsights"),
                web_insights: string_field(&map, "webInsights"),
                follow_up_queries: string_list(&map, "followUpQueries"),
            },
            Ok(_) => Self::default(),
            Err(_) => Self {
                summary: Some(raw.to_string()),
                key_findings: Some(Vec::new()),
                follow_up_queries: Some(Vec::new()),
                ..Default::default()
            },
        }
    }

    /// Fields missing here are taken from `earlier`.
    pub fn or(self, earlier: &Analysis) -> Self {
        Self {
            summary: self.summary.or_else(|| earlier.summary.clone()),
            key_findings: self.key_findings.or_else(|| earlier.key_findings.clone()),
            twitter_insights: self.twitter_insights.or_else(|| earlier.twitter_insights.clone()),
            web_insights: self.web_insights.or_else(|| earlier.web_insights.clone()),
            follow_up_queries: self.follow_up_queries.or_else(|| earlier.follow_up_queries.clone()),
        }
    }

    /// Proposed follow-ups, blanks dropped, at most three.
    pub fn follow_ups(&self) -> Vec<String> {
        self.follow_up_queries
            .iter()
            .flatten()
            .map(|q| q.trim())
            .filter(|q| !q.is_empty())
            .take(MAX_FOLLOW_UPS)
            .map(str::to_string)
            .collect()
    }
}

/// Citations for everything gathered: web links first, then one entry per
/// social author. Unique by URL.
pub fn build_sources(web: &[SearchResult], social: &[SocialSearchResult]) -> Vec<Source> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for result in web {
        if !result.link.is_empty() && seen.insert(result.link.clone()) {
            sources.push(Source {
                title: result.title.clone(),
                url: result.link.clone(),
                kind: SourceKind::Web,
            });
        }
    }

    for post in social {
        let username = post.user.username.trim();
        if username.is_empty() {
            continue;
        }
        let url = format!("https://twitter.com/{username}");
        if seen.insert(url.clone()) {
            sources.push(Source {
                title: format!("@{username}"),
                url,
                kind: SourceKind::Twitter,
            });
        }
    }

    sources
}

fn ai_error(err: AiError) -> SourceError {
    match err {
        AiError::Api { status, message } => SourceError::Status { status, message },
        AiError::Parse(m) => SourceError::Malformed(m),
        AiError::Network(m) | AiError::Header(m) => SourceError::Network(m),
    }
}

fn top<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items.iter().take(n).cloned().collect()
}

/// Results for one query from both searchers.
struct Gathered {
    query: String,
    web: Vec<SearchResult>,
    social: Vec<SocialSearchResult>,
}

#[derive(Clone)]
pub struct DeepResearcher {
    searcher: Arc<dyn WebSearcher>,
    social: Arc<dyn SocialSearcher>,
    model: Arc<dyn ChatModel>,
}

impl DeepResearcher {
    pub fn new(
        searcher: Arc<dyn WebSearcher>,
        social: Arc<dyn SocialSearcher>,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            searcher,
            social,
            model,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let searcher: Arc<dyn WebSearcher> = match &config.serpapi_api_key {
            Some(key) => Arc::new(SerpApiSearcher::new(key, &config.serpapi_base_url)),
            None => Arc::new(Unconfigured("SerpAPI")),
        };
        let social: Arc<dyn SocialSearcher> = match SocialApi::from_config(config) {
            Some(api) => Arc::new(api),
            None => Arc::new(Unconfigured("SocialAPI")),
        };
        let model: Arc<dyn ChatModel> = match &config.openrouter_api_key {
            Some(key) => Arc::new(
                OpenRouter::new(key.as_str(), config.openrouter_model.as_str())
                    .with_base_url(config.openrouter_base_url.as_str())
                    .with_app_name("Nexus Research"),
            ),
            None => Arc::new(Unconfigured("OpenRouter")),
        };
        Self::new(searcher, social, model)
    }

    /// Research a free-text query. Never fails: search failures leave their
    /// lists empty and a failed model call leaves the analysis empty.
    pub async fn deep_research(&self, query: &str, max_rounds: Option<u8>) -> DeepResearchResult {
        let run_id = Uuid::new_v4();
        let span = info_span!("deep_research", %run_id, query = query.trim());
        self.run(query.trim(), effective_rounds(max_rounds))
            .instrument(span)
            .await
    }

    async fn run(&self, query: &str, max_rounds: u8) -> DeepResearchResult {
        info!(max_rounds, "Deep research started");

        let round1 = self.gather(query).await;
        let mut all_web = round1.web.clone();
        let mut all_social = round1.social.clone();

        let round1_data = json!({
            "query": query,
            "webResults": top(&round1.web, ROUND1_WEB),
            "twitterResults": top(&round1.social, ROUND1_SOCIAL),
        });
        let first = self
            .analyze(
                ANALYSIS_PROMPT,
                format!("Research query: \"{query}\"\n\nData:\n{round1_data}"),
            )
            .await;
        let follow_ups = first.follow_ups();

        let mut rounds = 1;
        let analysis = if !follow_ups.is_empty() && max_rounds > 1 {
            info!(follow_ups = follow_ups.len(), "Running follow-up round");
            let gathered = join_all(follow_ups.iter().map(|q| self.gather(q))).await;
            for g in &gathered {
                all_web.extend(g.web.iter().cloned());
                all_social.extend(g.social.iter().cloned());
            }
            rounds = 2;

            let all_data = json!({
                "originalQuery": query,
                "round1Analysis": &first,
                "followUpData": gathered
                    .iter()
                    .map(|g| json!({
                        "query": g.query,
                        "webResults": top(&g.web, FOLLOW_UP_WEB),
                        "twitterResults": top(&g.social, FOLLOW_UP_SOCIAL),
                    }))
                    .collect::<Vec<_>>(),
            });
            self.analyze(
                SYNTHESIS_PROMPT,
                format!("Original query: \"{query}\"\n\nAll research data:\n{all_data}"),
            )
            .await
            .or(&first)
        } else {
            first
        };

        let sources = build_sources(&all_web, &all_social);
        let tweets: Vec<_> = dedup_posts(all_social).into_iter().take(RESULT_TWEETS).collect();
        let web: Vec<_> = dedup_by_link(all_web).into_iter().take(RESULT_WEB).collect();

        info!(rounds, sources = sources.len(), "Deep research complete");

        DeepResearchResult {
            summary: analysis.summary.unwrap_or_default(),
            key_findings: analysis.key_findings.unwrap_or_default(),
            twitter_insights: TwitterInsights {
                summary: analysis.twitter_insights.unwrap_or_default(),
                tweets,
            },
            web_results: WebInsights {
                summary: analysis.web_insights.unwrap_or_default(),
                results: web,
            },
            follow_up_queries: follow_ups,
            sources,
            rounds,
        }
    }

    /// Web and social search for one query, each side settling on its own.
    async fn gather(&self, query: &str) -> Gathered {
        let (web, social) = tokio::join!(self.searcher.search(query), self.social.search_posts(query));
        Gathered {
            query: query.to_string(),
            web: settle_list("web", query, web),
            social: settle_list("social", query, social),
        }
    }

    /// One bounded model call. A failed or timed-out call yields an empty
    /// analysis.
    async fn analyze(&self, system: &str, user: String) -> Analysis {
        let messages = [Message::system(system), Message::user(user)];
        let reply = bounded(LLM_TIMEOUT, async {
            self.model.chat(&messages).await.map_err(ai_error)
        })
        .await;

        match reply {
            Ok(text) => Analysis::from_reply(&text),
            Err(e) => {
                warn!(error = %e, "Model call failed");
                Analysis::default()
            }
        }
    }
}

fn settle_list<T>(side: &str, query: &str, outcome: SourceResult<Vec<T>>) -> Vec<T> {
    outcome.unwrap_or_else(|e| {
        if e.is_failure() {
            warn!(side, query, error = %e, "Search failed");
        }
        Vec::new()
    })
}
