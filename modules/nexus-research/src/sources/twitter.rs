use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use nexus_common::fetch::{fetch_json, LOOKUP_TIMEOUT};
use nexus_common::{SourceError, SourceResult, Tweet, TwitterProfile, TwitterResult};

use crate::traits::ProfileLookup;

const RECENT_TWEETS: &str = "10";

/// The official X/Twitter v2 API, bearer-token auth.
pub struct TwitterApi {
    client: reqwest::Client,
    bearer_token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    data: Option<TwitterProfile>,
}

#[derive(Debug, Deserialize)]
struct TweetsResponse {
    #[serde(default)]
    data: Vec<Tweet>,
}

impl TwitterApi {
    /// Lookup URL with the handle percent-encoded into a single path segment.
    fn user_url(&self, handle: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(handle.as_bytes()).collect();
        format!("{}/2/users/by/username/{}", self.base_url, encoded)
    }

    pub fn new(bearer_token: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            bearer_token: bearer_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn recent_tweets(&self, user_id: &str) -> SourceResult<Vec<Tweet>> {
        let request = self
            .client
            .get(format!("{}/2/users/{}/tweets", self.base_url, user_id))
            .bearer_auth(&self.bearer_token)
            .query(&[("max_results", RECENT_TWEETS), ("tweet.fields", "created_at")]);
        let data: TweetsResponse = fetch_json(request, LOOKUP_TIMEOUT).await?;
        Ok(data.data)
    }
}

#[async_trait]
impl ProfileLookup for TwitterApi {
    async fn profile(&self, handle: &str) -> SourceResult<TwitterResult> {
        let request = self
            .client
            .get(self.user_url(handle))
            .bearer_auth(&self.bearer_token)
            .query(&[("user.fields", "description,public_metrics,profile_image_url")]);
        let user: UserResponse = fetch_json(request, LOOKUP_TIMEOUT)
            .await
            .map_err(with_api_detail)?;

        let profile = user.data.unwrap_or_default();

        // A profile without its timeline is still worth returning.
        let tweets = match profile.id.as_deref() {
            Some(id) => self.recent_tweets(id).await.unwrap_or_else(|e| {
                warn!(handle, error = %e, "Tweet timeline fetch failed");
                Vec::new()
            }),
            None => Vec::new(),
        };

        Ok(TwitterResult { profile, tweets })
    }

    fn name(&self) -> &str {
        "Twitter"
    }
}

/// Replace a JSON error body with its `errors[0].message` or `detail`.
fn with_api_detail(err: SourceError) -> SourceError {
    match err {
        SourceError::Status { status, message } => {
            let detail = serde_json::from_str::<serde_json::Value>(&message)
                .ok()
                .and_then(|j| {
                    j.pointer("/errors/0/message")
                        .or_else(|| j.get("detail"))
                        .and_then(|v| v.as_str())
                        .map(str::to_string)
                });
            SourceError::Status {
                status,
                message: detail.unwrap_or(message),
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_detail_replaces_raw_body() {
        let err = with_api_detail(SourceError::Status {
            status: 401,
            message: r#"{"title":"Unauthorized","detail":"Unauthorized","status":401}"#.into(),
        });
        assert_eq!(err.to_string(), "HTTP 401: Unauthorized");

        let err = with_api_detail(SourceError::Status {
            status: 400,
            message: r#"{"errors":[{"message":"bad username"}]}"#.into(),
        });
        assert_eq!(err.to_string(), "HTTP 400: bad username");
    }

    #[test]
    fn non_json_body_is_kept() {
        let err = with_api_detail(SourceError::Status {
            status: 503,
            message: "upstream down".into(),
        });
        assert_eq!(err.to_string(), "HTTP 503: upstream down");
    }

    #[test]
    fn handle_stays_inside_one_path_segment() {
        let api = TwitterApi::new("token", "https://api.x.com/");
        assert_eq!(api.user_url("acme_labs"), "https://api.x.com/2/users/by/username/acme_labs");
        assert_eq!(
            api.user_url("../me?x=1"),
            "https://api.x.com/2/users/by/username/..%2Fme%3Fx%3D1"
        );
    }

    #[test]
    fn user_payload_maps_to_profile() {
        let user: UserResponse = serde_json::from_str(
            r#"{"data":{"id":"12","name":"Acme","username":"acme","public_metrics":{"followers_count":10,"listed_count":2}}}"#,
        )
        .unwrap();
        let profile = user.data.unwrap();
        assert_eq!(profile.id.as_deref(), Some("12"));
        assert_eq!(profile.public_metrics.unwrap().followers_count, Some(10));
    }
}
