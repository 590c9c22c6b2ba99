use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::{debug, warn};

use nexus_common::fetch::{fetch_json, LOOKUP_TIMEOUT};
use nexus_common::{CodeHostProfile, GitHubOrg, GitHubRepo, SourceError, SourceResult};

use crate::traits::CodeHost;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// GitHub REST API. The token is optional and only lifts rate limits.
pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: Option<&str>, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.map(String::from),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, "nexus-research");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl CodeHost for GitHubClient {
    async fn org(&self, login: &str) -> SourceResult<Option<GitHubOrg>> {
        match fetch_json(self.get(&format!("/orgs/{login}")), LOOKUP_TIMEOUT).await {
            Ok(org) => Ok(Some(org)),
            Err(SourceError::Status { status: 404, .. }) => {
                debug!(login, "No GitHub org");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn repos(&self, login: &str) -> SourceResult<Vec<GitHubRepo>> {
        let request = self
            .get(&format!("/orgs/{login}/repos"))
            .query(&[("sort", "updated"), ("per_page", "10")]);
        fetch_json(request, LOOKUP_TIMEOUT).await
    }
}

/// Org login guessed from a domain: its first dot-separated label.
pub fn org_login_for_domain(domain: &str) -> Option<&str> {
    domain.split('.').next().filter(|label| !label.is_empty())
}

/// Org profile plus recent repos. Repos are only fetched when the org
/// resolved, and a failed repo listing degrades to an empty list.
pub async fn code_host_profile(host: &dyn CodeHost, login: &str) -> SourceResult<CodeHostProfile> {
    let Some(org) = host.org(login).await? else {
        return Ok(CodeHostProfile::default());
    };

    let repos = host.repos(login).await.unwrap_or_else(|e| {
        warn!(login, error = %e, "GitHub repo listing failed");
        Vec::new()
    });

    Ok(CodeHostProfile {
        org: Some(org),
        repos,
    })
}
