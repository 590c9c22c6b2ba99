use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use nexus_common::fetch::{fetch_json, LOOKUP_TIMEOUT};
use nexus_common::{CalendarEvent, SourceResult};

use crate::traits::EventCalendar;

/// Events on the calendar owned by the configured Luma key.
pub struct LumaCalendar {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ListEventsResponse {
    #[serde(default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    event: Option<Value>,
}

/// One listed event, read on its own so a malformed entry is skipped
/// instead of failing the whole listing. `id` falls back to `api_id`.
fn calendar_event(raw: Value) -> Option<CalendarEvent> {
    let mut event: CalendarEvent = match serde_json::from_value(raw) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Skipping malformed Luma event");
            return None;
        }
    };
    if event.id.is_empty() {
        if let Some(Value::String(api_id)) = event.extra.get("api_id") {
            event.id = api_id.clone();
        }
    }
    Some(event)
}

fn listed_events(data: ListEventsResponse) -> Vec<CalendarEvent> {
    data.entries
        .into_iter()
        .filter_map(|e| e.event)
        .filter_map(calendar_event)
        .collect()
}

impl LumaCalendar {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl EventCalendar for LumaCalendar {
    async fn upcoming(&self, after: DateTime<Utc>, limit: u32) -> SourceResult<Vec<CalendarEvent>> {
        let request = self
            .client
            .get(format!("{}/v1/calendar/list-events", self.base_url))
            .bearer_auth(&self.api_key)
            .query(&[
                ("after", after.to_rfc3339_opts(SecondsFormat::Millis, true)),
                ("pagination_limit", limit.to_string()),
            ]);
        let data: ListEventsResponse = fetch_json(request, LOOKUP_TIMEOUT).await?;

        let events = listed_events(data);
        info!(count = events.len(), "Luma calendar events listed");
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_without_event_are_skipped() {
        let data: ListEventsResponse = serde_json::from_str(
            r#"{"entries":[{"event":{"id":"evt-1","name":"Demo Day","url":"https://lu.ma/demo"}},{"api_id":"x"}],"next_cursor":"c"}"#,
        )
        .unwrap();
        let events = listed_events(data);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name.as_deref(), Some("Demo Day"));
        assert_eq!(events[0].extra["url"], "https://lu.ma/demo");
    }

    #[test]
    fn api_id_stands_in_for_a_missing_id() {
        let data: ListEventsResponse = serde_json::from_str(
            r#"{"entries":[{"event":{"id":"evt-1","name":"A"}},{"event":{"api_id":"evt-2","name":"B"}}]}"#,
        )
        .unwrap();
        let events = listed_events(data);
        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["evt-1", "evt-2"]);
        assert_eq!(events[1].name.as_deref(), Some("B"));
    }

    #[test]
    fn malformed_entry_does_not_sink_the_listing() {
        let data: ListEventsResponse = serde_json::from_str(
            r#"{"entries":[{"event":{"id":"evt-1","start_at":42}},{"event":{"id":"evt-2","start_at":"2026-03-01T18:00:00.000Z"}}]}"#,
        )
        .unwrap();
        let events = listed_events(data);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "evt-2");
        assert_eq!(events[0].start_at.as_deref(), Some("2026-03-01T18:00:00.000Z"));
    }
}
