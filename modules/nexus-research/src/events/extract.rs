use std::sync::LazyLock;

use regex::Regex;

static RE_HEADING_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#+\s*").expect("valid regex"));
static RE_DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:description|about|details?)[:\s]*\n?([^\n]{20,500})").expect("valid regex")
});
static RE_HOST_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+\.").expect("valid regex"));

/// First non-blank line with heading markers stripped, when its length is
/// strictly between 2 and 200 characters.
pub fn title_from_content(content: &str) -> Option<String> {
    let line = content.lines().find(|l| !l.trim().is_empty())?;
    let cleaned = RE_HEADING_MARKERS.replace(line, "").trim().to_string();
    let len = cleaned.chars().count();
    (len > 2 && len < 200).then_some(cleaned)
}

pub fn extract_title(content: &str, fallback: &str) -> String {
    title_from_content(content).unwrap_or_else(|| fallback.to_string())
}

/// Text after a `description:` / `about:` / `details:` label.
pub fn extract_description(content: &str) -> Option<String> {
    RE_DESCRIPTION
        .captures(content)
        .map(|c| c[1].trim().to_string())
}

/// At most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Display title for an event URL nothing could be scraped from: the last
/// path segment, a leading `word.` dropped and dashes as spaces. Falls back
/// to the URL when that leaves two characters or fewer.
pub fn placeholder_title(url: &str) -> String {
    let segment = url
        .strip_suffix('/')
        .unwrap_or(url)
        .split('/')
        .filter(|s| !s.is_empty())
        .last()
        .unwrap_or("Event");
    let title = RE_HOST_PREFIX.replace(segment, "").replace('-', " ");
    if title.chars().count() > 2 {
        title
    } else {
        url.to_string()
    }
}
