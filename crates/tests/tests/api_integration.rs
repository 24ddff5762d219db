use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{json, Value};
use solace_api::{build_router, ApiConfig, ApiState};
use solace_core::MoodScore;
use solace_engine::EngineConfig;
use solace_storage::Store;
use tower::ServiceExt;

const API_KEY: &str = "dev-solace-key";

fn state_with(config: ApiConfig) -> ApiState {
    ApiState::new(config, EngineConfig::immediate(), Store::memory())
}

fn app_with(config: ApiConfig) -> Router {
    build_router(state_with(config))
}

fn app() -> Router {
    app_with(ApiConfig::default())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_authed(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap()
}

fn score(value: i64) -> MoodScore {
    MoodScore::new(value).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    let parsed = read_json(response).await;
    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["storage"], "memory");
}

#[tokio::test]
async fn chat_requires_api_key() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "text": "hello" }).to_string()))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let parsed = read_json(response).await;
    assert_eq!(parsed["error"], "unauthorized");
}

#[tokio::test]
async fn chat_classifies_anxiety() {
    let response = app()
        .oneshot(post_json(
            "/v1/chat",
            json!({ "text": "I feel really anxious about my exams" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-request-id").is_some());

    let parsed = read_json(response).await;
    assert_eq!(parsed["intent"], "anxiety");
    assert_eq!(parsed["is_emergency"], false);
    assert_eq!(parsed["language"], "english");
    assert_eq!(parsed["show_mood_tracker"], false);
    assert!(parsed.get("emergency_notice").is_none());
    assert!(parsed["message"].as_str().unwrap().contains("breath"));
}

#[tokio::test]
async fn crisis_message_carries_emergency_notice() {
    let response = app()
        .oneshot(post_json(
            "/v1/chat",
            json!({ "text": "I want to end my life", "language": "en" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    assert_eq!(parsed["intent"], "crisis");
    assert_eq!(parsed["is_emergency"], true);

    let helplines = parsed["emergency_notice"]["helplines"].as_array().unwrap();
    assert!(helplines
        .iter()
        .any(|helpline| helpline["contact"] == "112"));
}

#[tokio::test]
async fn tamil_request_gets_tamil_reply() {
    let response = app()
        .oneshot(post_json(
            "/v1/chat",
            json!({ "text": "எனக்கு தூக்கம் வரவில்லை", "language": "ta" }),
        ))
        .await
        .unwrap();

    let parsed = read_json(response).await;
    assert_eq!(parsed["intent"], "sleep");
    assert_eq!(parsed["language"], "tamil");
    let message = parsed["message"].as_str().unwrap();
    assert!(message.chars().any(|ch| ('\u{0B80}'..='\u{0BFF}').contains(&ch)));
}

#[tokio::test]
async fn mood_keyword_opens_tracker() {
    let response = app()
        .oneshot(post_json("/v1/chat", json!({ "text": "can I log my mood" })))
        .await
        .unwrap();

    let parsed = read_json(response).await;
    assert_eq!(parsed["intent"], "mood_tracking");
    assert_eq!(parsed["show_mood_tracker"], true);
}

#[tokio::test]
async fn oversized_chat_text_is_rejected() {
    let response = app()
        .oneshot(post_json("/v1/chat", json!({ "text": "a".repeat(4_001) })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let parsed = read_json(response).await;
    assert_eq!(parsed["error"], "text_too_long");
}

#[tokio::test]
async fn disclaimer_is_public_and_localized() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/v1/disclaimer?language=ta")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    assert_eq!(parsed["language"], "tamil");
    assert!(!parsed["disclaimer"].as_str().unwrap().is_empty());
    assert_eq!(parsed["helplines"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn mood_entry_is_saved_with_confirmation() {
    let saved = app()
        .oneshot(post_json(
            "/v1/mood",
            json!({ "score": 8, "note": " went for a walk ", "user_id": "asha" }),
        ))
        .await
        .unwrap();

    assert_eq!(saved.status(), StatusCode::OK);
    let saved = read_json(saved).await;
    assert_eq!(saved["entry"]["score"], 8);
    assert_eq!(saved["entry"]["note"], "went for a walk");
    assert_eq!(saved["entry"]["when"], "Today");
    assert!(!saved["title"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn history_lists_newest_first() {
    let state = state_with(ApiConfig::default());
    let now = Utc::now();
    state
        .journal
        .record_at("asha", score(8), "", now - ChronoDuration::days(2))
        .await
        .unwrap();
    state
        .journal
        .record_at("asha", score(2), "", now - ChronoDuration::hours(1))
        .await
        .unwrap();

    let history = build_router(state)
        .oneshot(get_authed("/v1/mood?user_id=asha"))
        .await
        .unwrap();
    assert_eq!(history.status(), StatusCode::OK);

    let parsed = read_json(history).await;
    let entries = parsed["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["score"], 2);
    assert_eq!(entries[0]["when"], "Today");
    assert_eq!(entries[1]["score"], 8);
    assert_eq!(entries[1]["when"], "2 days ago");
    assert_eq!(parsed["average_score"], 5.0);
    assert!(parsed.get("empty_message").is_none());
}

#[tokio::test]
async fn zero_limit_still_returns_latest_entry() {
    let state = state_with(ApiConfig::default());
    let now = Utc::now();
    state
        .journal
        .record_at("asha", score(3), "", now - ChronoDuration::hours(5))
        .await
        .unwrap();
    state
        .journal
        .record_at("asha", score(7), "", now - ChronoDuration::hours(1))
        .await
        .unwrap();

    let response = build_router(state)
        .oneshot(get_authed("/v1/mood?user_id=asha&limit=0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = read_json(response).await;
    let entries = parsed["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["score"], 7);
    assert_eq!(parsed["average_score"], 7.0);
    assert!(parsed.get("empty_message").is_none());
}

#[tokio::test]
async fn clearing_history_removes_only_that_user() {
    let state = state_with(ApiConfig::default());
    state.journal.record("asha", score(6), "").await.unwrap();
    state.journal.record("asha", score(4), "").await.unwrap();
    state.journal.record("ravi", score(9), "").await.unwrap();
    let app = build_router(state);

    let request = Request::builder()
        .method("DELETE")
        .uri("/v1/mood?user_id=asha")
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    assert_eq!(parsed["removed"], 2);

    let asha = read_json(
        app.clone()
            .oneshot(get_authed("/v1/mood?user_id=asha"))
            .await
            .unwrap(),
    )
    .await;
    assert!(asha["entries"].as_array().unwrap().is_empty());

    let ravi = read_json(
        app.oneshot(get_authed("/v1/mood?user_id=ravi"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(ravi["entries"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_history_has_message() {
    let response = app()
        .oneshot(get_authed("/v1/mood?user_id=nobody"))
        .await
        .unwrap();

    let parsed = read_json(response).await;
    assert!(parsed["entries"].as_array().unwrap().is_empty());
    assert!(parsed["average_score"].is_null());
    assert!(parsed["empty_message"].as_str().is_some());
}

#[tokio::test]
async fn out_of_range_mood_score_is_rejected() {
    let response = app()
        .oneshot(post_json("/v1/mood", json!({ "score": 11 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let parsed = read_json(response).await;
    assert_eq!(parsed["error"], "invalid_score");
}

#[tokio::test]
async fn rate_limit_applies_per_ip() {
    let app = app_with(ApiConfig {
        rate_limit_window: Duration::from_secs(60),
        rate_limit_max: 2,
        ..ApiConfig::default()
    });

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_json("/v1/chat", json!({ "text": "hi" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(post_json("/v1/chat", json!({ "text": "hi" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let health = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}
