use std::collections::HashSet;
use std::hash::Hash;

use nexus_common::{ScrapedEvent, SearchResult, SocialSearchResult};

/// Keep the first item for each key, preserving order.
pub fn dedup_by<T, K, F>(items: impl IntoIterator<Item = T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

pub fn dedup_by_link(results: impl IntoIterator<Item = SearchResult>) -> Vec<SearchResult> {
    dedup_by(results, |r| r.link.clone())
}

/// Reposts collapse on the first 100 characters of text.
pub fn dedup_posts(posts: impl IntoIterator<Item = SocialSearchResult>) -> Vec<SocialSearchResult> {
    dedup_by(posts, SocialSearchResult::dedup_key)
}

pub fn dedup_events(events: impl IntoIterator<Item = ScrapedEvent>) -> Vec<ScrapedEvent> {
    dedup_by(events, ScrapedEvent::dedup_key)
}
