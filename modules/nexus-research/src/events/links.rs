use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use nexus_common::normalize_event_url;

/// Hosts that serve event pages. Subdomains count.
pub const EVENT_HOSTS: &[&str] = &["lu.ma", "luma.com"];

static RE_BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://(?:www\.)?(?:lu\.ma|luma\.com)/[^\s"')\]>]+"#).expect("valid regex")
});
static RE_ATTR_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:href|url)=["']([^"']*(?:lu\.ma|luma\.com)[^"']*)["']"#).expect("valid regex")
});
static RE_MARKDOWN_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\]\((https?://(?:www\.)?(?:lu\.ma|luma\.com)[^)]+)\)"#).expect("valid regex")
});

fn is_event_host(host: &str) -> bool {
    let host = host.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    EVENT_HOSTS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")))
}

/// An absolute URL on an event host whose path has at least one segment.
pub fn is_event_host_url(link: &str) -> bool {
    let Ok(url) = Url::parse(link.trim()) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    is_event_host(host) && !url.path().trim_end_matches('/').is_empty()
}

/// Event links found in scraped page content, resolved against `base_url`.
///
/// Three passes: bare absolute URLs, `href=`/`url=` attributes, and markdown
/// link targets. Results are unique by normalized URL, in discovery order.
/// A base URL that does not parse yields no links.
pub fn discover_event_links(content: &str, base_url: &str) -> Vec<String> {
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };

    let bare = RE_BARE_URL.find_iter(content).map(|m| m.as_str());
    let attrs = RE_ATTR_URL
        .captures_iter(content)
        .filter_map(|c| c.get(1).map(|m| m.as_str()));
    let markdown = RE_MARKDOWN_URL
        .captures_iter(content)
        .filter_map(|c| c.get(1).map(|m| m.as_str()));

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for raw in bare.chain(attrs).chain(markdown) {
        let raw = raw.trim_end_matches(|c: char| ")]>'\"".contains(c) || c.is_whitespace());
        let Ok(resolved) = base.join(raw) else {
            continue;
        };
        let resolved = resolved.to_string();
        if is_event_host_url(&resolved) && seen.insert(normalize_event_url(&resolved)) {
            links.push(resolved);
        }
    }

    links
}

/// Last non-empty path segment of a URL, if any.
pub fn last_path_segment(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}
