use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use nexus_api::{router, AppState};
use nexus_common::{Config, TwitterProfile, TwitterResult};
use nexus_research::testing::{
    page, search_hit, MockChatModel, MockProfiles, MockScraper, MockSearcher, MockSocialSearcher,
};
use nexus_research::{DeepResearcher, ResearchSources, Researcher, WebScraper};

fn app(reader: MockScraper, model: MockChatModel) -> Router {
    let searcher = Arc::new(MockSearcher::new().on_query(
        "EigenLayer",
        vec![search_hit("https://eigenlayer.xyz", "EigenLayer")],
    ));
    let profiles = MockProfiles::new().on_handle(
        "acme",
        TwitterResult {
            profile: TwitterProfile {
                username: Some("acme".into()),
                ..Default::default()
            },
            tweets: vec![],
        },
    );
    let researcher = Researcher::new(
        ResearchSources::builder()
            .scraper(WebScraper::new(None, Arc::new(reader)))
            .profiles(Arc::new(profiles))
            .build(),
    );
    let deep = DeepResearcher::new(
        searcher,
        Arc::new(MockSocialSearcher::new()),
        Arc::new(model),
    );
    let config = Config {
        serpapi_api_key: Some("serp-key".into()),
        ..Config::default()
    };
    router(Arc::new(AppState {
        config,
        researcher,
        deep,
    }))
}

fn default_app() -> Router {
    app(MockScraper::new(), MockChatModel::new())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_check() {
    let response = default_app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("cache-control").unwrap(),
        "no-store"
    );
}

#[tokio::test]
async fn status_lists_configured_providers_and_routes() {
    let (status, body) = send(default_app(), get("/api/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["providers"]["SERPAPI_API_KEY"], json!(true));
    assert_eq!(body["providers"]["FIRECRAWL_API_KEY"], json!(false));
    assert!(body["routes"]
        .as_array()
        .unwrap()
        .contains(&json!("POST /api/research/deep")));
}

#[tokio::test]
async fn research_requires_a_name() {
    let (status, body) = send(default_app(), post_json("/api/research", json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name is required");
}

#[tokio::test]
async fn research_cleans_handle_and_returns_every_field() {
    let (status, body) = send(
        default_app(),
        post_json(
            "/api/research",
            json!({ "name": " Acme ", "website": "  ", "twitterHandle": "@acme" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["twitter"]["profile"]["username"], "acme");
    assert_eq!(body["website"], Value::Null);
    assert_eq!(body["github"], json!({ "org": null, "repos": [] }));
    for field in ["google", "luma", "lumaScraped", "errors"] {
        assert_eq!(body[field], json!([]), "{field}");
    }
}

#[tokio::test]
async fn deep_research_requires_a_query() {
    let (status, body) = send(default_app(), post_json("/api/research/deep", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "query is required");
}

#[tokio::test]
async fn deep_research_single_round() {
    let model = MockChatModel::new().reply(r#"{"summary":"restaking","followUpQueries":["more"]}"#);
    let (status, body) = send(
        app(MockScraper::new(), model),
        post_json("/api/research/deep", json!({ "query": "EigenLayer", "maxRounds": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rounds"], 1);
    assert_eq!(body["summary"], "restaking");
    assert_eq!(body["followUpQueries"], json!(["more"]));
    assert_eq!(
        body["sources"],
        json!([{ "title": "EigenLayer", "url": "https://eigenlayer.xyz", "type": "web" }])
    );
}

#[tokio::test]
async fn events_for_company_requires_company() {
    let (status, _) = send(default_app(), get("/api/luma/events/for-company")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn events_for_company_falls_back_to_placeholders() {
    let (status, body) = send(default_app(), get("/api/luma/events/for-company?company=Acme%20Labs")).await;

    assert_eq!(status, StatusCode::OK);
    let events = body.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["url"], "https://lu.ma/acmelabs");
    assert_eq!(events[0]["title"], "acmelabs");
    assert_eq!(events[0]["startAt"], Value::Null);
}

#[tokio::test]
async fn events_for_company_scrapes_the_calendar() {
    let reader = MockScraper::new()
        .on_page("https://lu.ma/acme", page("See https://lu.ma/acme-hack", "Acme"))
        .on_page("https://lu.ma/acme-hack", page("# Acme Hack\nMarch 8, 2025", ""));
    let (status, body) = send(
        app(reader, MockChatModel::new()),
        get("/api/luma/events/for-company?company=Acme"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{
            "title": "Acme Hack",
            "url": "https://lu.ma/acme-hack",
            "date": "2025-03-08",
            "startAt": "2025-03-08T00:00:00Z",
            "description": null,
            "snippet": null,
            "organizer": null
        }])
    );
}
