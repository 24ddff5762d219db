pub mod rate_limit;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::{Json, Query, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{body::Body, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solace_core::mood::{empty_history_message, relative_day, saved_confirmation};
use solace_core::safety::helplines;
use solace_core::{
    emergency_notice, safety_disclaimer, EmergencyNotice, EngineResponse, Helpline, Language,
    MoodEntry, MoodScore,
};
use solace_engine::{EngineConfig, MoodJournal, ResponseEngine};
use solace_observability::AppMetrics;
use solace_storage::Store;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::rate_limit::IpRateLimiter;

const MAX_CHAT_TEXT_LEN: usize = 4_000;
const MAX_MOOD_NOTE_LEN: usize = 1_000;
const MAX_USER_ID_LEN: usize = 64;
const DEFAULT_USER_ID: &str = "local";
const DEFAULT_HISTORY_LIMIT: usize = 10;
const BODY_LIMIT_BYTES: usize = 32 * 1024;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_key: String,
    pub rate_limit_window: Duration,
    pub rate_limit_max: usize,
    pub allowed_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: "dev-solace-key".to_string(),
            rate_limit_window: Duration::from_secs(60),
            rate_limit_max: 60,
            allowed_origins: Vec::new(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_key: env::var("SOLACE_API_KEY").unwrap_or(defaults.api_key),
            rate_limit_window: env::var("SOLACE_API_RATE_LIMIT_WINDOW_SECONDS")
                .ok()
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.rate_limit_window),
            rate_limit_max: env::var("SOLACE_API_RATE_LIMIT_MAX")
                .ok()
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(defaults.rate_limit_max),
            allowed_origins: env::var("SOLACE_ALLOWED_ORIGINS")
                .map(|value| {
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<ResponseEngine>,
    pub journal: Arc<MoodJournal<Store>>,
    pub metrics: Arc<AppMetrics>,
    pub api_key: String,
    pub limiter: IpRateLimiter,
    pub allowed_origins: Arc<Vec<String>>,
    pub storage_backend: &'static str,
}

impl ApiState {
    pub fn new(config: ApiConfig, engine_config: EngineConfig, store: Store) -> Self {
        let metrics = AppMetrics::shared();
        let storage_backend = store.backend_name();

        Self {
            engine: Arc::new(ResponseEngine::new(engine_config, metrics.clone())),
            journal: Arc::new(MoodJournal::new(Arc::new(store), metrics.clone())),
            metrics,
            api_key: config.api_key,
            limiter: IpRateLimiter::new(config.rate_limit_window, config.rate_limit_max),
            allowed_origins: Arc::new(config.allowed_origins),
            storage_backend,
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    storage: &'static str,
    reply_delay_millis: u128,
    metrics: solace_observability::MetricsSnapshot,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    text: String,
    language: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatReply {
    #[serde(flatten)]
    response: EngineResponse,
    language: Language,
    show_mood_tracker: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    emergency_notice: Option<EmergencyNotice>,
}

#[derive(Debug, Deserialize)]
struct LanguageQuery {
    language: Option<String>,
}

#[derive(Debug, Serialize)]
struct DisclaimerResponse {
    language: Language,
    disclaimer: &'static str,
    helplines: Vec<Helpline>,
}

#[derive(Debug, Deserialize)]
struct MoodRequest {
    score: i64,
    note: Option<String>,
    user_id: Option<String>,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MoodHistoryQuery {
    user_id: Option<String>,
    language: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct MoodUserQuery {
    user_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct MoodClearedResponse {
    user_id: String,
    removed: u64,
}

#[derive(Debug, Serialize)]
struct MoodEntryView {
    id: String,
    score: u8,
    emoji: &'static str,
    label: &'static str,
    note: String,
    recorded_at: DateTime<Utc>,
    when: String,
}

#[derive(Debug, Serialize)]
struct MoodSavedResponse {
    entry: MoodEntryView,
    title: String,
    description: String,
}

#[derive(Debug, Serialize)]
struct MoodHistoryResponse {
    entries: Vec<MoodEntryView>,
    average_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    empty_message: Option<&'static str>,
}

pub async fn build_app() -> Result<Router> {
    let store = if let Ok(database_url) = env::var("SOLACE_DATABASE_URL") {
        Store::sqlite(&database_url).await?
    } else {
        Store::memory()
    };

    let state = ApiState::new(ApiConfig::from_env(), EngineConfig::from_env(), store);
    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/chat", post(chat))
        .route("/v1/disclaimer", get(disclaimer))
        .route(
            "/v1/mood",
            get(mood_history).post(mood_record).delete(mood_clear),
        )
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: Utc::now().to_rfc3339(),
        storage: state.storage_backend,
        reply_delay_millis: state.engine.config().reply_delay.as_millis(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn chat(State(state): State<ApiState>, Json(request): Json<ChatRequest>) -> Response {
    if request.text.chars().count() > MAX_CHAT_TEXT_LEN {
        return error_response(
            StatusCode::BAD_REQUEST,
            "text_too_long",
            format!("text must be at most {MAX_CHAT_TEXT_LEN} characters"),
        );
    }

    let language = Language::from_optional_str(request.language.as_deref());
    let response = state.engine.respond(&request.text, language).await;

    let reply = ChatReply {
        show_mood_tracker: response.intent.opens_mood_tracker(),
        emergency_notice: response
            .is_emergency
            .then(|| emergency_notice(language)),
        language,
        response,
    };

    (StatusCode::OK, Json(reply)).into_response()
}

async fn disclaimer(Query(query): Query<LanguageQuery>) -> impl IntoResponse {
    let language = Language::from_optional_str(query.language.as_deref());
    Json(DisclaimerResponse {
        language,
        disclaimer: safety_disclaimer(language),
        helplines: helplines(language),
    })
}

async fn mood_record(State(state): State<ApiState>, Json(request): Json<MoodRequest>) -> Response {
    let score = match MoodScore::new(request.score) {
        Ok(score) => score,
        Err(err) => {
            return error_response(StatusCode::BAD_REQUEST, "invalid_score", err.to_string())
        }
    };

    let note = request.note.unwrap_or_default();
    if note.chars().count() > MAX_MOOD_NOTE_LEN {
        return error_response(
            StatusCode::BAD_REQUEST,
            "note_too_long",
            format!("note must be at most {MAX_MOOD_NOTE_LEN} characters"),
        );
    }

    let user_id = match resolve_user_id(request.user_id.as_deref()) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    let language = Language::from_optional_str(request.language.as_deref());

    match state.journal.record(&user_id, score, &note).await {
        Ok(entry) => {
            let (title, description) = saved_confirmation(entry.score, language);
            let payload = MoodSavedResponse {
                entry: entry_view(entry, language, Utc::now()),
                title,
                description,
            };
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => {
            error!(error = %err, "mood entry failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "mood_save_failed",
                "could not save mood entry".to_string(),
            )
        }
    }
}

async fn mood_history(
    State(state): State<ApiState>,
    Query(query): Query<MoodHistoryQuery>,
) -> Response {
    let user_id = match resolve_user_id(query.user_id.as_deref()) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };
    let language = Language::from_optional_str(query.language.as_deref());
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).max(1);

    match state.journal.history(&user_id, limit).await {
        Ok(entries) => {
            let scores = entries.iter().map(|entry| entry.score).collect::<Vec<_>>();
            let now = Utc::now();
            let payload = MoodHistoryResponse {
                average_score: solace_core::mood::average_score(&scores),
                empty_message: entries
                    .is_empty()
                    .then(|| empty_history_message(language)),
                entries: entries
                    .into_iter()
                    .map(|entry| entry_view(entry, language, now))
                    .collect(),
            };
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => {
            error!(error = %err, "mood history failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "mood_history_failed",
                "could not load mood history".to_string(),
            )
        }
    }
}

async fn mood_clear(
    State(state): State<ApiState>,
    Query(query): Query<MoodUserQuery>,
) -> Response {
    let user_id = match resolve_user_id(query.user_id.as_deref()) {
        Ok(user_id) => user_id,
        Err(response) => return response,
    };

    match state.journal.clear(&user_id).await {
        Ok(removed) => {
            let payload = MoodClearedResponse { user_id, removed };
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => {
            error!(error = %err, "mood clear failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "mood_clear_failed",
                "could not clear mood history".to_string(),
            )
        }
    }
}

fn entry_view(entry: MoodEntry, language: Language, now: DateTime<Utc>) -> MoodEntryView {
    MoodEntryView {
        when: relative_day(entry.recorded_at, now, language),
        id: entry.id,
        score: entry.score.value(),
        emoji: entry.score.emoji(),
        label: entry.score.label(language),
        note: entry.note,
        recorded_at: entry.recorded_at,
    }
}

fn resolve_user_id(requested: Option<&str>) -> std::result::Result<String, Response> {
    let user_id = requested
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_USER_ID);

    if user_id.chars().count() > MAX_USER_ID_LEN {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "invalid_user_id",
            format!("user_id must be at most {MAX_USER_ID_LEN} characters"),
        ));
    }

    Ok(user_id.to_string())
}

fn error_response(status: StatusCode, error: &str, message: String) -> Response {
    (
        status,
        Json(serde_json::json!({
            "error": error,
            "message": message
        })),
    )
        .into_response()
}

fn is_public_endpoint(path: &str) -> bool {
    matches!(path, "/health" | "/v1/disclaimer")
}

async fn api_key_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if request.method() == Method::OPTIONS || is_public_endpoint(path) {
        return next.run(request).await;
    }

    let header_key = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if header_key != state.api_key {
        return error_response(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or invalid x-api-key".to_string(),
        );
    }

    next.run(request).await
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || is_public_endpoint(request.uri().path()) {
        return next.run(request).await;
    }

    let ip = request_ip(&request);
    if !state.limiter.allow(&ip) {
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "rate limit exceeded for this IP".to_string(),
        );
    }

    next.run(request).await
}

fn request_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .next()
                .unwrap_or("unknown")
                .trim()
                .to_string()
        })
        .unwrap_or_else(|| "local".to_string())
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let origins = if origins.is_empty() {
        vec![HeaderValue::from_static("http://localhost:5173")]
    } else {
        origins
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-api-key"),
        ])
}

async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    headers.insert(
        header::HeaderName::from_static("content-security-policy"),
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'; base-uri 'none'"),
    );

    response
}
