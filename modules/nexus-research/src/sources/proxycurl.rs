use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use nexus_common::fetch::{fetch_json, LOOKUP_TIMEOUT};
use nexus_common::{CompanyProfile, SourceResult};

use crate::traits::CompanyEnricher;

/// Company enrichment: domain -> profile URL -> company profile.
pub struct ProxycurlEnricher {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    url: Option<String>,
}

/// Bare host of a website value: scheme and path dropped.
pub fn domain_of(website: &str) -> String {
    let trimmed = website.trim();
    let without_scheme = match trimmed.find("://") {
        Some(i) if trimmed[..i].eq_ignore_ascii_case("http") || trimmed[..i].eq_ignore_ascii_case("https") => {
            &trimmed[i + 3..]
        }
        _ => trimmed,
    };
    without_scheme
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

impl ProxycurlEnricher {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CompanyEnricher for ProxycurlEnricher {
    async fn enrich(&self, domain: &str) -> SourceResult<Option<CompanyProfile>> {
        let domain = domain_of(domain);

        let request = self
            .client
            .get(format!("{}/api/linkedin/company/resolve", self.base_url))
            .bearer_auth(&self.api_key)
            .query(&[("company_domain", domain.as_str())]);
        let resolved: ResolveResponse = fetch_json(request, LOOKUP_TIMEOUT).await?;

        let Some(profile_url) = resolved.url.filter(|u| !u.is_empty()) else {
            debug!(domain = domain.as_str(), "No company profile for domain");
            return Ok(None);
        };

        let request = self
            .client
            .get(format!("{}/api/v2/linkedin/company", self.base_url))
            .bearer_auth(&self.api_key)
            .query(&[("url", profile_url.as_str())]);
        let profile: CompanyProfile = fetch_json(request, LOOKUP_TIMEOUT).await?;
        Ok(Some(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_strips_scheme_and_path() {
        assert_eq!(domain_of("https://acme.com/about"), "acme.com");
        assert_eq!(domain_of("HTTP://www.acme.io"), "www.acme.io");
        assert_eq!(domain_of("acme.xyz/"), "acme.xyz");
        assert_eq!(domain_of(" acme.com "), "acme.com");
    }
}
