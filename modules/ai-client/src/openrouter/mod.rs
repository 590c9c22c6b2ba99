mod client;
pub(crate) mod types;

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::{ChatModel, Message};
use client::OpenRouterClient;
use types::ChatRequest;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_TEMPERATURE: f32 = 0.3;

// =============================================================================
// OpenRouter Agent
// =============================================================================

#[derive(Clone)]
pub struct OpenRouter {
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
    app_name: Option<String>,
    site_url: Option<String>,
    http: reqwest::Client,
}

impl OpenRouter {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: OPENROUTER_API_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            app_name: None,
            site_url: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn with_site_url(mut self, url: impl Into<String>) -> Self {
        self.site_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> OpenRouterClient<'_> {
        OpenRouterClient {
            api_key: &self.api_key,
            base_url: &self.base_url,
            app_name: self.app_name.as_deref(),
            site_url: self.site_url.as_deref(),
            http: &self.http,
        }
    }
}

#[async_trait]
impl ChatModel for OpenRouter {
    async fn chat(&self, messages: &[Message]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        self.client().chat(&request).await
    }
}
