pub mod rest;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use nexus_common::Config;
use nexus_research::{DeepResearcher, Researcher};

/// Routes exposed by the API, as listed on the status page.
pub const ROUTES: &[&str] = &[
    "GET /",
    "GET /api/status",
    "POST /api/research",
    "POST /api/research/deep",
    "GET /api/luma/events/for-company?company=",
];

pub struct AppState {
    pub config: Config,
    pub researcher: Researcher,
    pub deep: DeepResearcher,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let researcher = Researcher::from_config(&config);
        let deep = DeepResearcher::from_config(&config);
        Self {
            config,
            researcher,
            deep,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        .route("/api/status", get(rest::api_status))
        .route("/api/research", post(rest::api_research))
        .route("/api/research/deep", post(rest::api_deep_research))
        .route("/api/luma/events/for-company", get(rest::api_events_for_company))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Research output is per-request; never cache it
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Method + path only; query strings carry company names
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
