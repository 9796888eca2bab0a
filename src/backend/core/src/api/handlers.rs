//! HTTP request handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::warn;

use super::{ApiResponse, AppState, LimitQuery};
use crate::error::{Mi8Error, Result};
use crate::events::NewsDraft;
use crate::telemetry::MetricsRegistry;

// ═══════════════════════════════════════════════════════════════════════════════
// Health Check
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    backend: &'static str,
    version: &'static str,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let backend = state.service.backend().name();
    let (status, code, error) = match state.service.ping().await {
        Ok(()) => ("healthy", StatusCode::OK, None),
        Err(e) => {
            warn!(backend, error = %e, "Health check failed");
            ("degraded", StatusCode::SERVICE_UNAVAILABLE, Some(e.user_message().to_string()))
        }
    };

    let report = HealthReport {
        status,
        backend,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        error,
    };
    (code, Json(report))
}

pub async fn prometheus_metrics() -> impl IntoResponse {
    (
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        MetricsRegistry::global().render(),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// News Handlers
// ═══════════════════════════════════════════════════════════════════════════════

pub async fn publish_news(
    State(state): State<AppState>,
    Json(draft): Json<NewsDraft>,
) -> Result<impl IntoResponse> {
    if draft.name.trim().is_empty() {
        return Err(Mi8Error::validation("name must not be empty").with_context("field", "name"));
    }

    let event = state.service.ingest(draft).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(event))))
}

pub async fn latest_news(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse> {
    let events = state.service.latest_global(query.resolve()?).await?;
    Ok(Json(ApiResponse::success(events)))
}

pub async fn city_news(
    State(state): State<AppState>,
    Path(city): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse> {
    let events = state.service.latest_for_city(&city, query.resolve()?).await?;
    Ok(Json(ApiResponse::success(events)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Score Handlers
// ═══════════════════════════════════════════════════════════════════════════════

pub async fn city_score(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<impl IntoResponse> {
    let score = state.service.score_of(&city).await?;
    Ok(Json(ApiResponse::success(score)))
}

pub async fn rankings(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse> {
    let ranked = state.service.top_cities(query.resolve()?).await?;
    Ok(Json(ApiResponse::success(ranked)))
}

pub async fn ranking_scores(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse> {
    let scores = state.service.top_city_scores(query.resolve()?).await?;
    Ok(Json(ApiResponse::success(scores)))
}
