//! Best-effort event dates from unstructured page text.
//!
//! Three rules, tried in order, first valid match wins:
//! 1. ISO-8601 timestamp (`2025-03-14T18:00`, optional seconds, fraction, `Z`)
//! 2. long form `Month DD, YYYY` (month recognised by its first three letters)
//! 3. bare `YYYY-MM-DD`
//!
//! Each rule only looks at its first regex match. All times are read as UTC.

use std::sync::LazyLock;

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

static RE_ISO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(?::\d{2})?(?:\.\d+)?Z?").expect("valid regex")
});
static RE_LONG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]*\s+(\d{1,2}),?\s+(\d{4})")
        .expect("valid regex")
});
static RE_SHORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid regex"));

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// A parsed event date: the calendar day and the instant it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDate {
    /// `YYYY-MM-DD`
    pub date: String,
    pub start_at: DateTime<Utc>,
}

impl EventDate {
    fn from_instant(start_at: DateTime<Utc>) -> Self {
        Self {
            date: start_at.format("%Y-%m-%d").to_string(),
            start_at,
        }
    }
}

fn midnight(day: NaiveDate) -> Option<DateTime<Utc>> {
    day.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

pub fn iso_timestamp(text: &str) -> Option<EventDate> {
    let raw = RE_ISO.find(text)?.as_str().trim_end_matches('Z');
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| EventDate::from_instant(dt.and_utc()))
}

pub fn long_form(text: &str) -> Option<EventDate> {
    let caps = RE_LONG.captures(text)?;
    let prefix = caps[1].to_lowercase();
    let month = MONTHS.iter().position(|m| *m == prefix)? as u32 + 1;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    let start_at = midnight(NaiveDate::from_ymd_opt(year, month, day)?)?;
    Some(EventDate::from_instant(start_at))
}

pub fn bare_date(text: &str) -> Option<EventDate> {
    let raw = RE_SHORT.find(text)?.as_str();
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(EventDate {
        date: raw.to_string(),
        start_at: midnight(day)?,
    })
}

/// First date any rule finds, in rule order.
pub fn extract_date(text: &str) -> Option<EventDate> {
    let rules: [fn(&str) -> Option<EventDate>; 3] = [iso_timestamp, long_form, bare_date];
    rules.iter().find_map(|rule| rule(text))
}

/// Start of the trailing twelve-month window ending at `now`.
pub fn twelve_months_before(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(12))
        .unwrap_or(now - chrono::Duration::days(365))
}

/// Whether an instant falls in `[now - 12 months, now]`.
pub fn within_last_year(start_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    start_at >= twelve_months_before(now) && start_at <= now
}
