//! Shape normalization for SocialAPI responses.
//!
//! The provider's payloads vary by endpoint and plan. Accepted shapes:
//!
//! - profile object: `user`, `profile` or `data` (first one that is an
//!   object), otherwise the root object itself
//! - username: `username`, else `screen_name`, else the requested handle
//! - avatar: `profile_image_url`, else `avatar`
//! - metrics: `public_metrics` or `metrics` object, or a bare numeric
//!   `followers_count`
//! - posts: `tweets`, `data` or `recent_tweets` (first one that is an array)
//! - post text: `text`, else `full_text`; numeric ids are stringified
//! - search: `tweets`, `data` or `results` array, or a bare array
//!
//! Nothing provider-shaped leaves this module.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub followers_count: Option<u64>,
    pub following_count: Option<u64>,
    pub tweet_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub username: String,
    pub description: Option<String>,
    pub profile_image_url: Option<String>,
    pub metrics: Option<Metrics>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub text: String,
    pub created_at: Option<String>,
}

/// A profile and its recent posts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTimeline {
    pub profile: Profile,
    pub posts: Vec<Post>,
}

/// One hit from keyword search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPost {
    pub text: String,
    pub author_name: String,
    pub author_username: String,
    pub created_at: Option<String>,
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn first_object<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Map<String, Value>> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_object))
}

fn first_array<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Vec<Value>> {
    keys.iter().find_map(|k| obj.get(*k).and_then(Value::as_array))
}

fn post_text(obj: &Map<String, Value>) -> String {
    str_field(obj, "text")
        .or_else(|| str_field(obj, "full_text"))
        .unwrap_or_default()
}

fn normalize_metrics(user: &Map<String, Value>) -> Option<Metrics> {
    let raw = ["public_metrics", "metrics", "followers_count"]
        .iter()
        .find_map(|k| user.get(*k).filter(|v| !v.is_null()))?;

    match raw {
        Value::Object(m) => Some(Metrics {
            followers_count: m.get("followers_count").and_then(Value::as_u64),
            following_count: m.get("following_count").and_then(Value::as_u64),
            tweet_count: m.get("tweet_count").and_then(Value::as_u64),
        }),
        Value::Number(n) => Some(Metrics {
            followers_count: n.as_u64(),
            ..Default::default()
        }),
        _ => None,
    }
}

fn normalize_post(value: &Value) -> Option<Post> {
    let obj = value.as_object()?;
    let id = match obj.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let text = post_text(obj);
    if id.is_empty() && text.is_empty() {
        return None;
    }
    Some(Post {
        id,
        text,
        created_at: str_field(obj, "created_at"),
    })
}

/// Map a user-lookup payload into a [`UserTimeline`]. Never fails; missing
/// fields stay empty and the username falls back to `handle`.
pub fn normalize_user(handle: &str, data: &Value) -> UserTimeline {
    let empty = Map::new();
    let root = data.as_object().unwrap_or(&empty);
    let user = first_object(root, &["user", "profile", "data"]).unwrap_or(root);

    let profile = Profile {
        id: str_field(user, "id"),
        name: str_field(user, "name"),
        username: str_field(user, "username")
            .or_else(|| str_field(user, "screen_name"))
            .unwrap_or_else(|| handle.trim_start_matches('@').to_string()),
        description: str_field(user, "description"),
        profile_image_url: str_field(user, "profile_image_url")
            .or_else(|| str_field(user, "avatar")),
        metrics: normalize_metrics(user),
    };

    let posts = first_array(root, &["tweets", "data", "recent_tweets"])
        .map(|items| items.iter().filter_map(normalize_post).collect())
        .unwrap_or_default();

    UserTimeline { profile, posts }
}

/// Map a keyword-search payload into a list of [`SearchPost`]s.
pub fn normalize_search(data: &Value) -> Vec<SearchPost> {
    let items = match data {
        Value::Array(items) => Some(items),
        Value::Object(root) => first_array(root, &["tweets", "data", "results"]),
        _ => None,
    };

    let Some(items) = items else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| {
            let user = obj.get("user").and_then(Value::as_object);
            SearchPost {
                text: post_text(obj),
                author_name: user.and_then(|u| str_field(u, "name")).unwrap_or_default(),
                author_username: user
                    .and_then(|u| str_field(u, "screen_name").or_else(|| str_field(u, "username")))
                    .unwrap_or_default(),
                created_at: str_field(obj, "created_at"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_user_with_public_metrics() {
        let data = json!({
            "user": {
                "id": "42",
                "name": "Acme",
                "username": "acme",
                "public_metrics": {"followers_count": 1200, "following_count": 3, "tweet_count": 900}
            },
            "tweets": [{"id": "1", "text": "shipping"}]
        });

        let timeline = normalize_user("acme", &data);
        assert_eq!(timeline.profile.id.as_deref(), Some("42"));
        assert_eq!(timeline.profile.username, "acme");
        let metrics = timeline.profile.metrics.unwrap();
        assert_eq!(metrics.followers_count, Some(1200));
        assert_eq!(metrics.tweet_count, Some(900));
        assert_eq!(timeline.posts.len(), 1);
    }

    #[test]
    fn profile_nesting_with_screen_name_and_avatar() {
        let data = json!({
            "profile": {"screen_name": "acme_hq", "avatar": "https://img/acme.png", "followers_count": 77},
            "recent_tweets": [{"id": 99, "full_text": "gm"}]
        });

        let timeline = normalize_user("@acme", &data);
        assert_eq!(timeline.profile.username, "acme_hq");
        assert_eq!(timeline.profile.profile_image_url.as_deref(), Some("https://img/acme.png"));
        assert_eq!(timeline.profile.metrics.unwrap().followers_count, Some(77));
        assert_eq!(timeline.posts[0].id, "99");
        assert_eq!(timeline.posts[0].text, "gm");
    }

    #[test]
    fn data_array_is_posts_not_profile() {
        let data = json!({
            "name": "Root Level",
            "data": [{"id": "7", "text": "hello"}, {"id": "", "text": ""}, "junk"]
        });

        let timeline = normalize_user("@rooty", &data);
        assert_eq!(timeline.profile.name.as_deref(), Some("Root Level"));
        assert_eq!(timeline.profile.username, "rooty");
        assert_eq!(timeline.posts.len(), 1);
        assert_eq!(timeline.posts[0].id, "7");
    }

    #[test]
    fn non_object_payload_keeps_handle() {
        let timeline = normalize_user("acme", &json!("nope"));
        assert_eq!(timeline.profile.username, "acme");
        assert!(timeline.posts.is_empty());
        assert!(timeline.profile.metrics.is_none());
    }

    #[test]
    fn search_accepts_results_key_and_bare_array() {
        let wrapped = json!({"results": [
            {"full_text": "restaking", "user": {"name": "Eigen", "screen_name": "eigen"}, "created_at": "2025-01-01"}
        ]});
        let posts = normalize_search(&wrapped);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].text, "restaking");
        assert_eq!(posts[0].author_username, "eigen");

        let bare = json!([{"text": "hi", "user": {"username": "x"}}]);
        let posts = normalize_search(&bare);
        assert_eq!(posts[0].author_username, "x");
        assert_eq!(posts[0].author_name, "");
    }

    #[test]
    fn search_without_array_is_empty() {
        assert!(normalize_search(&json!({"meta": {}})).is_empty());
        assert!(normalize_search(&json!(null)).is_empty());
    }
}
