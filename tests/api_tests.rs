use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_string_contains, method, path},
    Mock, MockServer, ResponseTemplate,
};

use cinebot::api::{create_router, AppState};
use cinebot::services::{extract::ExtractionMode, GeminiProvider, SessionStore};

const MODEL_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn gemini_provider(gemini: &MockServer) -> GeminiProvider {
    GeminiProvider::new(
        "test_key".to_string(),
        gemini.uri(),
        "gemini-2.0-flash".to_string(),
        Duration::from_secs(5),
        ExtractionMode::Balanced,
    )
}

fn create_test_server(gemini: &MockServer) -> TestServer {
    let app = create_router(AppState::new(Arc::new(gemini_provider(gemini))));
    TestServer::new(app).unwrap()
}

fn batch(prefix: &str, count: usize) -> Value {
    let items: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "title": format!("{prefix} {i}"),
                "year": 1990 + i,
                "summary": "A story among the stars.",
                "rating": 7.5,
                "streamingPlatforms": ["Netflix"]
            })
        })
        .collect();
    let text = json!({ "recommendations": items }).to_string();

    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

async fn mount_batch(gemini: &MockServer, prompt_fragment: &str, body: Value) {
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(body_string_contains(prompt_fragment))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(gemini)
        .await;
}

async fn create_session(server: &TestServer) -> String {
    let response = server.post("/api/v1/sessions").await;
    response.assert_status(StatusCode::CREATED);
    let session: Value = response.json();
    assert_eq!(session["phase"], "idle");
    assert_eq!(session["has_searched"], false);
    session["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let gemini = MockServer::start().await;
    let server = create_test_server(&gemini);

    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let gemini = MockServer::start().await;
    let server = create_test_server(&gemini);
    let id = "3f2504e0-4f89-11d3-9a0c-0305e82c3301";

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(id),
        )
        .await;

    assert_eq!(response.header("x-request-id"), id);
}

#[tokio::test]
async fn test_platforms_lists_reference_vocabulary() {
    let gemini = MockServer::start().await;
    let server = create_test_server(&gemini);

    let response = server.get("/api/v1/platforms").await;
    response.assert_status_ok();
    let platforms: Vec<Value> = response.json();
    assert!(platforms.iter().any(|p| p["name"] == "Crunchyroll"));
}

#[tokio::test]
async fn test_search_with_movies_only_keeps_movies_active() {
    let gemini = MockServer::start().await;
    mount_batch(&gemini, "relevant movies", batch("Space Movie", 12)).await;
    mount_batch(&gemini, "relevant TV shows", batch("Space Show", 0)).await;
    let server = create_test_server(&gemini);
    let id = create_session(&server).await;

    let response = server
        .post(&format!("/api/v1/sessions/{id}/search"))
        .json(&json!({ "query": "space opera" }))
        .await;

    response.assert_status_ok();
    let session: Value = response.json();
    assert_eq!(session["phase"], "ready");
    assert_eq!(session["active"], "movies");
    assert_eq!(session["query"], "space opera");
    assert_eq!(session["movies"]["cards"].as_array().unwrap().len(), 12);
    assert_eq!(session["movies"]["notice"], Value::Null);
    assert!(session["tv_shows"]["cards"].as_array().unwrap().is_empty());
    assert_eq!(session["tv_shows"]["notice"], "No results found for this category.");

    let card = &session["movies"]["cards"][0];
    assert_eq!(card["rating_label"], "7.5");
    assert_eq!(
        card["platforms"][0]["icon_url"],
        "https://img.icons8.com/color/48/netflix.png"
    );
}

#[tokio::test]
async fn test_search_with_tv_shows_only_switches_tab() {
    let gemini = MockServer::start().await;
    mount_batch(&gemini, "relevant movies", batch("Anime Movie", 0)).await;
    mount_batch(&gemini, "relevant TV shows", batch("Anime Show", 4)).await;
    let server = create_test_server(&gemini);
    let id = create_session(&server).await;

    let response = server
        .post(&format!("/api/v1/sessions/{id}/search"))
        .json(&json!({ "query": "slice of life anime" }))
        .await;

    let session: Value = response.json();
    assert_eq!(session["active"], "tv_shows");
}

#[tokio::test]
async fn test_failed_search_clears_results_and_reports_error() {
    let gemini = MockServer::start().await;
    mount_batch(&gemini, "relevant movies", batch("Movie", 12)).await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(body_string_contains("relevant TV shows"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": { "message": "overloaded" } })),
        )
        .mount(&gemini)
        .await;
    let server = create_test_server(&gemini);
    let id = create_session(&server).await;

    let response = server
        .post(&format!("/api/v1/sessions/{id}/search"))
        .json(&json!({ "query": "westerns" }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["error"], "overloaded");

    let session: Value = server.get(&format!("/api/v1/sessions/{id}")).await.json();
    assert_eq!(session["has_searched"], true);
    assert_eq!(session["error"], "overloaded");
    assert!(session["movies"]["cards"].as_array().unwrap().is_empty());
    assert!(session["tv_shows"]["cards"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_show_more_appends_and_exhausts() {
    let gemini = MockServer::start().await;
    // Exclusion prompts are matched first; only they mention earlier titles.
    mount_batch(&gemini, "Do NOT include any of the following titles: Movie 0", batch("Extra", 5)).await;
    mount_batch(&gemini, "relevant movies", batch("Movie", 12)).await;
    mount_batch(&gemini, "relevant TV shows", batch("Show", 12)).await;
    let server = create_test_server(&gemini);
    let id = create_session(&server).await;

    server
        .post(&format!("/api/v1/sessions/{id}/search"))
        .json(&json!({ "query": "heists" }))
        .await
        .assert_status_ok();

    let response = server.post(&format!("/api/v1/sessions/{id}/more")).await;
    response.assert_status_ok();
    let session: Value = response.json();

    assert_eq!(session["movies"]["cards"].as_array().unwrap().len(), 17);
    assert_eq!(session["tv_shows"]["cards"].as_array().unwrap().len(), 12);
    assert_eq!(session["can_fetch_more"], false);
    assert_eq!(session["movies"]["notice"], "No more results found.");
}

#[tokio::test]
async fn test_select_active_and_unknown_session() {
    let gemini = MockServer::start().await;
    let server = create_test_server(&gemini);
    let id = create_session(&server).await;

    let response = server
        .put(&format!("/api/v1/sessions/{id}/active"))
        .json(&json!({ "media_type": "tv_shows" }))
        .await;
    response.assert_status_ok();
    let session: Value = response.json();
    assert_eq!(session["active"], "tv_shows");

    server
        .delete(&format!("/api/v1/sessions/{id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/api/v1/sessions/{id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_query_is_rejected() {
    let gemini = MockServer::start().await;
    let server = create_test_server(&gemini);
    let id = create_session(&server).await;

    server
        .post(&format!("/api/v1/sessions/{id}/search"))
        .json(&json!({ "query": "   " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stateless_recommendations() {
    let gemini = MockServer::start().await;
    mount_batch(&gemini, "relevant TV shows", batch("Show", 3)).await;
    let server = create_test_server(&gemini);

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({
            "query": "cozy mysteries",
            "media_type": "tv_shows",
            "exclude_titles": ["Midsomer Murders"]
        }))
        .await;

    response.assert_status_ok();
    let items: Vec<Value> = response.json();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["title"], "Show 0");
    assert_eq!(items[0]["streamingPlatforms"][0], "Netflix");
}

#[tokio::test]
async fn test_idle_session_expires_to_not_found() {
    let gemini = MockServer::start().await;
    let state = AppState::with_sessions(
        Arc::new(gemini_provider(&gemini)),
        SessionStore::with_ttl(Duration::from_millis(50)),
    );
    let server = TestServer::new(create_router(state)).unwrap();
    let id = create_session(&server).await;

    tokio::time::sleep(Duration::from_millis(100)).await;

    server
        .get(&format!("/api/v1/sessions/{id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .post(&format!("/api/v1/sessions/{id}/more"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
