use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use news_core::{proxy_document, settings_from_json, NewsItem, SettingsMap};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/news", get(latest_news))
        .route("/api/news/trt-sondakika.json", get(latest_news))
        .route("/api/news/trt-sondakika", get(raw_feed))
        .route("/api/settings", get(read_settings).post(write_settings))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn latest_news(State(state): State<AppState>) -> Json<Vec<NewsItem>> {
    Json(state.news.latest().await)
}

async fn raw_feed(State(state): State<AppState>) -> Result<Response, ApiError> {
    let document = proxy_document(&state.client, &state.raw_feed_url, state.request_timeout)
        .await
        .map_err(ApiError::Proxy)?;
    let status = StatusCode::from_u16(document.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, [(CONTENT_TYPE, document.content_type)], document.body).into_response())
}

async fn read_settings(State(state): State<AppState>) -> Result<Json<SettingsMap>, ApiError> {
    Ok(Json(state.settings.snapshot().await?))
}

async fn write_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers)?;
    let updates = settings_from_json(body);
    info!(keys = ?updates.keys().collect::<Vec<_>>(), "updating settings");
    state.settings.update(updates).await?;
    Ok(Json(json!({ "ok": true })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = state.admin_token.as_deref().ok_or(ApiError::WritesDisabled)?;
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);
    match presented {
        Some(token) if token == expected => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}
