//! Provider adapters. Each one maps a single external API into the shared
//! types in `nexus_common` and reports failure as a `SourceError`.

pub mod github;
pub mod luma;
pub mod proxycurl;
pub mod serpapi;
pub mod social;
pub mod twitter;

use std::collections::HashMap;

use futures::future::join_all;
use tracing::warn;

use nexus_common::{SearchResult, SourceResult, TwitterResult};

use crate::dedup::dedup_by_link;
use crate::traits::{ProfileLookup, WebSearcher};

pub use github::GitHubClient;
pub use luma::LumaCalendar;
pub use proxycurl::ProxycurlEnricher;
pub use serpapi::SerpApiSearcher;
pub use social::SocialApi;
pub use twitter::TwitterApi;

/// Company overview search: two queries run together, merged by link in
/// first-seen order. Fails only when both queries fail.
pub async fn search_company(
    searcher: &dyn WebSearcher,
    name: &str,
) -> SourceResult<Vec<SearchResult>> {
    let overview_q = format!("{name} company overview funding");
    let sponsorship_q = format!("{name} web3 sponsorship event partnership");

    let (overview, sponsorship) =
        tokio::join!(searcher.search(&overview_q), searcher.search(&sponsorship_q));

    let merged = match (overview, sponsorship) {
        (Ok(a), Ok(b)) => a.into_iter().chain(b).collect::<Vec<_>>(),
        (Ok(a), Err(e)) | (Err(e), Ok(a)) => {
            if e.is_failure() {
                warn!(name, error = %e, "One company search query failed");
            }
            a
        }
        (Err(e), Err(_)) => return Err(e),
    };

    Ok(dedup_by_link(merged))
}

/// Strip a leading `@` and surrounding whitespace from a handle.
pub fn clean_handle(handle: &str) -> &str {
    handle.trim().trim_start_matches('@').trim()
}

/// Look up many handles at once. Handles are cleaned and deduplicated; a
/// failed lookup maps to `None` rather than failing the batch.
pub async fn lookup_profiles(
    lookup: &dyn ProfileLookup,
    handles: &[String],
) -> HashMap<String, Option<TwitterResult>> {
    let mut unique: Vec<String> = Vec::new();
    for handle in handles {
        let handle = clean_handle(handle);
        if !handle.is_empty() && !unique.iter().any(|h| h == handle) {
            unique.push(handle.to_string());
        }
    }

    let results = join_all(unique.iter().map(|h| lookup.profile(h))).await;

    unique
        .into_iter()
        .zip(results)
        .map(|(handle, result)| {
            let profile = match result {
                Ok(profile) => Some(profile),
                Err(e) => {
                    if e.is_failure() {
                        warn!(handle = handle.as_str(), source = lookup.name(), error = %e, "Profile lookup failed");
                    }
                    None
                }
            };
            (handle, profile)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{search_hit, MockProfiles, MockSearcher};
    use crate::traits::Unconfigured;
    use nexus_common::{SourceError, TwitterProfile};

    #[tokio::test]
    async fn company_search_merges_and_dedups() {
        let searcher = MockSearcher::new()
            .on_query(
                "Acme company overview funding",
                vec![search_hit("https://a.com", "A"), search_hit("https://b.com", "B")],
            )
            .on_query(
                "Acme web3 sponsorship event partnership",
                vec![search_hit("https://b.com", "B again"), search_hit("https://c.com", "C")],
            );

        let results = search_company(&searcher, "Acme").await.unwrap();
        let links: Vec<_> = results.iter().map(|r| r.link.as_str()).collect();
        assert_eq!(links, vec!["https://a.com", "https://b.com", "https://c.com"]);
        assert_eq!(results[1].title, "B");
        assert_eq!(searcher.queries().len(), 2);
    }

    #[tokio::test]
    async fn company_search_survives_one_failure() {
        let searcher = MockSearcher::new().on_query(
            "Acme company overview funding",
            vec![search_hit("https://a.com", "A")],
        );

        let results = search_company(&searcher, "Acme").await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn company_search_unconfigured_is_unavailable() {
        let result = search_company(&Unconfigured("SerpAPI"), "Acme").await;
        assert!(matches!(result, Err(SourceError::Unavailable("SerpAPI"))));
    }

    #[tokio::test]
    async fn batch_lookup_cleans_and_dedups_handles() {
        let acme = TwitterResult {
            profile: TwitterProfile {
                username: Some("acme".into()),
                ..Default::default()
            },
            tweets: vec![],
        };
        let lookup = MockProfiles::new().on_handle("acme", acme.clone());

        let handles = vec!["@acme".to_string(), "acme ".to_string(), "  ".to_string(), "ghost".to_string()];
        let results = lookup_profiles(&lookup, &handles).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results["acme"], Some(acme));
        assert_eq!(results["ghost"], None);
        assert_eq!(lookup.calls(), vec!["acme", "ghost"]);
    }
}
