use std::env;

/// How the social provider expects its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SocialApiAuth {
    #[default]
    Bearer,
    ApiKeyHeader,
}

/// Application configuration loaded from environment variables.
///
/// Built once at process start and passed by reference into every adapter.
/// Every provider key is optional; an unset key short-circuits that source.
#[derive(Debug, Clone)]
pub struct Config {
    // Scraping
    pub firecrawl_api_key: Option<String>,
    pub firecrawl_base_url: String,
    pub jina_reader_url: String,

    // Search
    pub serpapi_api_key: Option<String>,
    pub serpapi_base_url: String,

    // Social
    pub socialapi_api_key: Option<String>,
    pub socialapi_base_url: String,
    pub socialapi_user_path: Option<String>,
    pub socialapi_auth: SocialApiAuth,
    pub twitter_bearer_token: Option<String>,
    pub twitter_api_url: String,

    // Enrichment
    pub proxycurl_api_key: Option<String>,
    pub proxycurl_base_url: String,
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub luma_api_key: Option<String>,
    pub luma_api_url: String,

    // AI
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub openrouter_model: String,

    // Web server
    pub api_host: String,
    pub api_port: u16,
}

impl Default for Config {
    /// Public endpoints, no keys.
    fn default() -> Self {
        Self {
            firecrawl_api_key: None,
            firecrawl_base_url: "https://api.firecrawl.dev".to_string(),
            jina_reader_url: "https://r.jina.ai".to_string(),
            serpapi_api_key: None,
            serpapi_base_url: "https://serpapi.com".to_string(),
            socialapi_api_key: None,
            socialapi_base_url: "https://api.socialapi.me".to_string(),
            socialapi_user_path: None,
            socialapi_auth: SocialApiAuth::Bearer,
            twitter_bearer_token: None,
            twitter_api_url: "https://api.twitter.com".to_string(),
            proxycurl_api_key: None,
            proxycurl_base_url: "https://nubela.co/proxycurl".to_string(),
            github_token: None,
            github_api_url: "https://api.github.com".to_string(),
            luma_api_key: None,
            luma_api_url: "https://public-api.luma.com".to_string(),
            openrouter_api_key: None,
            openrouter_base_url: "https://openrouter.ai/api/v1".to_string(),
            openrouter_model: "openai/gpt-4o-mini".to_string(),
            api_host: "0.0.0.0".to_string(),
            api_port: 3030,
        }
    }
}

impl Config {
    /// Load configuration from `.env` (if present) and the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let api_port = match get("API_PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("API_PORT must be a number, got {port:?}"))?,
            None => defaults.api_port,
        };

        let socialapi_auth = match get("SOCIALAPI_AUTH_HEADER").as_deref() {
            Some("X-API-Key") => SocialApiAuth::ApiKeyHeader,
            _ => SocialApiAuth::Bearer,
        };

        Ok(Self {
            firecrawl_api_key: get("FIRECRAWL_API_KEY"),
            firecrawl_base_url: get("FIRECRAWL_BASE_URL").unwrap_or(defaults.firecrawl_base_url),
            jina_reader_url: get("JINA_READER_URL").unwrap_or(defaults.jina_reader_url),
            serpapi_api_key: get("SERPAPI_API_KEY"),
            serpapi_base_url: get("SERPAPI_BASE_URL").unwrap_or(defaults.serpapi_base_url),
            socialapi_api_key: get("SOCIALAPI_API_KEY"),
            socialapi_base_url: get("SOCIALAPI_BASE_URL").unwrap_or(defaults.socialapi_base_url),
            socialapi_user_path: get("SOCIALAPI_TWITTER_USER_PATH"),
            socialapi_auth,
            twitter_bearer_token: get("TWITTER_BEARER_TOKEN"),
            twitter_api_url: get("TWITTER_API_URL").unwrap_or(defaults.twitter_api_url),
            proxycurl_api_key: get("PROXYCURL_API_KEY"),
            proxycurl_base_url: get("PROXYCURL_BASE_URL").unwrap_or(defaults.proxycurl_base_url),
            github_token: get("GITHUB_TOKEN"),
            github_api_url: get("GITHUB_API_URL").unwrap_or(defaults.github_api_url),
            luma_api_key: get("LUMA_API_KEY"),
            luma_api_url: get("LUMA_API_URL").unwrap_or(defaults.luma_api_url),
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            openrouter_base_url: get("OPENROUTER_BASE_URL")
                .unwrap_or(defaults.openrouter_base_url),
            openrouter_model: get("OPENROUTER_MODEL").unwrap_or(defaults.openrouter_model),
            api_host: get("API_HOST").unwrap_or(defaults.api_host),
            api_port,
        })
    }

    /// Which optional provider keys are present, by env var name.
    pub fn configured_keys(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("FIRECRAWL_API_KEY", self.firecrawl_api_key.is_some()),
            ("SERPAPI_API_KEY", self.serpapi_api_key.is_some()),
            ("SOCIALAPI_API_KEY", self.socialapi_api_key.is_some()),
            ("TWITTER_BEARER_TOKEN", self.twitter_bearer_token.is_some()),
            ("PROXYCURL_API_KEY", self.proxycurl_api_key.is_some()),
            ("GITHUB_TOKEN", self.github_token.is_some()),
            ("LUMA_API_KEY", self.luma_api_key.is_some()),
            ("OPENROUTER_API_KEY", self.openrouter_api_key.is_some()),
        ]
    }

    pub fn log_keys(&self) {
        fn preview(val: &Option<String>) -> String {
            match val {
                Some(v) => {
                    let n = v.char_indices().nth(5).map(|(i, _)| i).unwrap_or(v.len());
                    format!("{}...({} chars)", &v[..n], v.len())
                }
                None => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  FIRECRAWL_API_KEY: {}", preview(&self.firecrawl_api_key));
        tracing::info!("  SERPAPI_API_KEY: {}", preview(&self.serpapi_api_key));
        tracing::info!("  SOCIALAPI_API_KEY: {}", preview(&self.socialapi_api_key));
        tracing::info!("  TWITTER_BEARER_TOKEN: {}", preview(&self.twitter_bearer_token));
        tracing::info!("  PROXYCURL_API_KEY: {}", preview(&self.proxycurl_api_key));
        tracing::info!("  GITHUB_TOKEN: {}", preview(&self.github_token));
        tracing::info!("  LUMA_API_KEY: {}", preview(&self.luma_api_key));
        tracing::info!("  OPENROUTER_API_KEY: {}", preview(&self.openrouter_api_key));
        tracing::info!("  OPENROUTER_MODEL: {}", self.openrouter_model);
    }
}
