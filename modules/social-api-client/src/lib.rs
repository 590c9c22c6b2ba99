pub mod error;
pub mod types;

pub use error::{Result, SocialApiError};
pub use types::{normalize_search, normalize_user, Metrics, Post, Profile, SearchPost, UserTimeline};

use serde_json::Value;

const DEFAULT_BASE_URL: &str = "https://api.socialapi.me";
const DEFAULT_USER_PATH: &str = "/twitter/user/:username";

/// How the API key is presented on user lookups. Search always sends it as
/// a bearer token, whatever this is set to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Auth {
    #[default]
    Bearer,
    ApiKeyHeader,
}

pub struct SocialApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    auth: Auth,
    user_path: String,
}

impl SocialApiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            auth: Auth::Bearer,
            user_path: DEFAULT_USER_PATH.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    /// Path template for user lookups. `:username` is replaced by the handle;
    /// an absolute `http(s)` template is used as-is.
    pub fn with_user_path(mut self, template: &str) -> Self {
        self.user_path = template.to_string();
        self
    }

    fn user_url(&self, handle: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(handle.as_bytes()).collect();
        let path = self.user_path.replacen(":username", &encoded, 1);
        if path.starts_with("http") {
            path
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth {
            Auth::Bearer => request.bearer_auth(&self.api_key),
            Auth::ApiKeyHeader => request.header("X-API-Key", &self.api_key),
        }
    }

    async fn get_json(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SocialApiError::Api {
                status: status.as_u16(),
                message: error_detail(&body),
            });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Fetch one user's profile and recent posts. A leading `@` is stripped.
    pub async fn user(&self, handle: &str) -> Result<UserTimeline> {
        let handle = handle.trim().trim_start_matches('@').trim();
        if handle.is_empty() {
            return Err(SocialApiError::InvalidInput("empty handle".to_string()));
        }

        let url = self.user_url(handle);
        tracing::debug!(handle, url = %url, "SocialAPI user lookup");
        let data = self.get_json(self.authorize(self.client.get(&url))).await?;
        Ok(normalize_user(handle, &data))
    }

    /// Keyword search over recent posts. The search endpoint only takes
    /// bearer auth, so the configured [`Auth`] does not apply here.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchPost>> {
        let url = format!("{}/twitter/search", self.base_url);
        tracing::debug!(query, "SocialAPI search");
        let request = self
            .client
            .get(&url)
            .query(&[("query", query)])
            .bearer_auth(&self.api_key);
        let data = self.get_json(request).await?;
        Ok(normalize_search(&data))
    }
}

/// Pull a readable message out of an error body: `message`, `error`, or the
/// first of `errors`, falling back to the raw body.
fn error_detail(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    let detail = json
        .get("message")
        .or_else(|| json.get("error"))
        .or_else(|| json.get("errors").and_then(|e| e.get(0)));
    match detail {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => body.to_string(),
        Some(other) => other.to_string(),
    }
}
