use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use typed_builder::TypedBuilder;

use crate::error::NexusError;

// --- Query seed ---

/// The seed for one company research call.
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct ResearchInput {
    #[builder(setter(into))]
    pub name: String,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub website: Option<String>,
    #[serde(default)]
    #[builder(default, setter(strip_option, into))]
    pub twitter_handle: Option<String>,
    /// Run the enrichment lookups. Absent means yes.
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub enrich: Option<bool>,
}

impl ResearchInput {
    pub fn should_enrich(&self) -> bool {
        self.enrich != Some(false)
    }

    pub fn validate(&self) -> Result<(), NexusError> {
        if self.name.trim().is_empty() {
            return Err(NexusError::Validation("name is required".to_string()));
        }
        Ok(())
    }
}

// --- Source shapes ---

/// Normalized page extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub content: String,
    pub title: String,
}

/// One organic web search hit. `link` is the dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialUser {
    pub name: String,
    pub username: String,
}

/// Length of the text prefix used to collapse reposts of the same post.
pub const SOCIAL_DEDUP_PREFIX_CHARS: usize = 100;

/// One social post returned by a keyword search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSearchResult {
    pub text: String,
    pub user: SocialUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl SocialSearchResult {
    pub fn dedup_key(&self) -> String {
        self.text.chars().take(SOCIAL_DEDUP_PREFIX_CHARS).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tweet_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitterProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A social profile and its recent posts, whichever provider produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitterResult {
    pub profile: TwitterProfile,
    pub tweets: Vec<Tweet>,
}

/// Company enrichment profile. Unknown provider fields pass through in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headquarters_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialties: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitHubOrg {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Org profile plus its most recently updated repos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeHostProfile {
    pub org: Option<GitHubOrg>,
    pub repos: Vec<GitHubRepo>,
}

/// An event from the configured calendar. Anything beyond the named fields
/// (including Luma's `api_id`) is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An event discovered by scraping an event host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedEvent {
    pub title: String,
    pub url: String,
    pub date: Option<String>,
    pub start_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub snippet: Option<String>,
    pub organizer: Option<String>,
}

impl ScrapedEvent {
    /// An event known only by its URL.
    pub fn bare(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            date: None,
            start_at: None,
            description: None,
            snippet: None,
            organizer: None,
        }
    }

    pub fn dedup_key(&self) -> String {
        normalize_event_url(&self.url)
    }
}

/// Trailing slash stripped, lowercased.
pub fn normalize_event_url(url: &str) -> String {
    let trimmed = url.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_lowercase()
}

// --- Aggregates ---

/// Everything gathered about one company. Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResult {
    pub website: Option<ScrapeResult>,
    pub google: Vec<SearchResult>,
    pub twitter: Option<TwitterResult>,
    pub proxycurl: Option<CompanyProfile>,
    pub github: CodeHostProfile,
    pub luma: Vec<CalendarEvent>,
    pub luma_scraped: Vec<ScrapedEvent>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Web,
    Twitter,
}

/// A citation in a deep-research answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitterInsights {
    pub summary: String,
    pub tweets: Vec<SocialSearchResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebInsights {
    pub summary: String,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepResearchResult {
    pub summary: String,
    pub key_findings: Vec<String>,
    pub twitter_insights: TwitterInsights,
    pub web_results: WebInsights,
    pub follow_up_queries: Vec<String>,
    pub sources: Vec<Source>,
    pub rounds: u8,
}
