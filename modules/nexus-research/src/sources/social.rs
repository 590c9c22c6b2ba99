use async_trait::async_trait;

use nexus_common::fetch::{bounded, SOCIAL_TIMEOUT};
use nexus_common::{
    Config, PublicMetrics, SocialApiAuth, SocialSearchResult, SocialUser, SourceError,
    SourceResult, Tweet, TwitterProfile, TwitterResult,
};
use social_api_client::{Auth, SearchPost, SocialApiClient, SocialApiError, UserTimeline};

use crate::traits::{ProfileLookup, SocialSearcher};

/// SocialAPI as both a profile lookup and a keyword searcher.
pub struct SocialApi {
    client: SocialApiClient,
}

impl SocialApi {
    pub fn new(client: SocialApiClient) -> Self {
        Self { client }
    }

    /// `None` when no key is configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let key = config.socialapi_api_key.clone()?;
        let auth = match config.socialapi_auth {
            SocialApiAuth::Bearer => Auth::Bearer,
            SocialApiAuth::ApiKeyHeader => Auth::ApiKeyHeader,
        };
        let mut client = SocialApiClient::new(key)
            .with_base_url(&config.socialapi_base_url)
            .with_auth(auth);
        if let Some(path) = &config.socialapi_user_path {
            client = client.with_user_path(path);
        }
        Some(Self::new(client))
    }
}

fn social_error(err: SocialApiError) -> SourceError {
    match err {
        SocialApiError::Network(m) => SourceError::Network(m),
        SocialApiError::Api { status, message } => SourceError::Status { status, message },
        SocialApiError::Parse(m) | SocialApiError::InvalidInput(m) => SourceError::Malformed(m),
    }
}

fn into_twitter_result(timeline: UserTimeline) -> TwitterResult {
    let p = timeline.profile;
    TwitterResult {
        profile: TwitterProfile {
            id: p.id,
            name: p.name,
            username: Some(p.username),
            description: p.description,
            profile_image_url: p.profile_image_url,
            public_metrics: p.metrics.map(|m| PublicMetrics {
                followers_count: m.followers_count,
                following_count: m.following_count,
                tweet_count: m.tweet_count,
            }),
        },
        tweets: timeline
            .posts
            .into_iter()
            .map(|post| Tweet {
                id: post.id,
                text: post.text,
                created_at: post.created_at,
            })
            .collect(),
    }
}

fn into_search_result(post: SearchPost) -> SocialSearchResult {
    SocialSearchResult {
        text: post.text,
        user: SocialUser {
            name: post.author_name,
            username: post.author_username,
        },
        created_at: post.created_at,
    }
}

#[async_trait]
impl ProfileLookup for SocialApi {
    async fn profile(&self, handle: &str) -> SourceResult<TwitterResult> {
        let timeline = bounded(SOCIAL_TIMEOUT, async {
            self.client.user(handle).await.map_err(social_error)
        })
        .await?;
        Ok(into_twitter_result(timeline))
    }

    fn name(&self) -> &str {
        "SocialAPI"
    }
}

#[async_trait]
impl SocialSearcher for SocialApi {
    async fn search_posts(&self, query: &str) -> SourceResult<Vec<SocialSearchResult>> {
        let posts = bounded(SOCIAL_TIMEOUT, async {
            self.client.search(query).await.map_err(social_error)
        })
        .await?;
        Ok(posts.into_iter().map(into_search_result).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timeline_maps_to_twitter_result() {
        let timeline = social_api_client::normalize_user(
            "acme",
            &json!({"user": {"screen_name": "acme", "followers_count": 5}, "tweets": [{"id": 1, "text": "gm"}]}),
        );
        let result = into_twitter_result(timeline);
        assert_eq!(result.profile.username.as_deref(), Some("acme"));
        assert_eq!(result.profile.public_metrics.unwrap().followers_count, Some(5));
        assert_eq!(result.tweets[0].id, "1");
    }

    #[test]
    fn unconfigured_key_yields_none() {
        assert!(SocialApi::from_config(&Config::default()).is_none());
    }

    #[test]
    fn api_errors_keep_status() {
        let err = social_error(SocialApiError::Api {
            status: 429,
            message: "slow down".into(),
        });
        assert!(matches!(err, SourceError::Status { status: 429, .. }));
    }
}
