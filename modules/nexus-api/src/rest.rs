use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use tracing::info;

use nexus_common::ResearchInput;
use nexus_research::events::{calendar_url_for_company, placeholder_events};
use nexus_research::sources::clean_handle;

use crate::{AppState, ROUTES};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepResearchRequest {
    query: Option<String>,
    max_rounds: Option<u8>,
}

#[derive(Deserialize)]
pub struct EventsQuery {
    company: Option<String>,
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

pub async fn api_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let providers: serde_json::Map<String, serde_json::Value> = state
        .config
        .configured_keys()
        .into_iter()
        .map(|(name, configured)| (name.to_string(), configured.into()))
        .collect();
    Json(serde_json::json!({
        "providers": providers,
        "routes": ROUTES,
    }))
}

pub async fn api_research(
    State(state): State<Arc<AppState>>,
    Json(mut input): Json<ResearchInput>,
) -> Response {
    if input.validate().is_err() {
        return bad_request("name is required");
    }
    input.name = input.name.trim().to_string();
    input.website = input
        .website
        .as_deref()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string);
    input.twitter_handle = input
        .twitter_handle
        .as_deref()
        .map(clean_handle)
        .filter(|h| !h.is_empty())
        .map(str::to_string);

    let result = state.researcher.research_company(&input).await;
    Json(result).into_response()
}

pub async fn api_deep_research(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DeepResearchRequest>,
) -> Response {
    let Some(query) = body.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
        return bad_request("query is required");
    };
    let result = state.deep.deep_research(query, body.max_rounds).await;
    Json(result).into_response()
}

pub async fn api_events_for_company(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Response {
    let Some(company) = params.company.as_deref().map(str::trim).filter(|c| !c.is_empty()) else {
        return bad_request("Query param 'company' required");
    };

    let Some(calendar_url) = calendar_url_for_company(company) else {
        return Json(Vec::<nexus_common::ScrapedEvent>::new()).into_response();
    };
    let urls = vec![calendar_url];

    let mut events = state.researcher.events().events_from_urls(company, &urls).await;
    if events.is_empty() {
        info!(company, "No events scraped, returning placeholders");
        events = placeholder_events(&urls);
    }
    Json(events).into_response()
}
