//! HTTP API for MI8 Core.
//!
//! ```text
//! POST /api/v1/news                    ingest an event
//! GET  /api/v1/news/latest             newest events
//! GET  /api/v1/cities/:city/news       newest events for a city
//! GET  /api/v1/cities/:city/score      clamped score card
//! GET  /api/v1/rankings                top cities by total score
//! GET  /api/v1/rankings/scores         score cards for the top cities
//! GET  /health
//! GET  /metrics
//! ```

mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::{Mi8Error, Result};
use crate::service::NewsService;

/// Default page size for list endpoints.
pub const DEFAULT_LIMIT: usize = 10;

/// Largest accepted `limit`.
pub const MAX_LIMIT: usize = 1000;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: NewsService,
}

impl AppState {
    pub fn new(service: NewsService) -> Self {
        Self { service }
    }
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let v1 = Router::new()
        .route("/news", post(handlers::publish_news))
        .route("/news/latest", get(handlers::latest_news))
        .route("/cities/:city/news", get(handlers::city_news))
        .route("/cities/:city/score", get(handlers::city_score))
        .route("/rankings", get(handlers::rankings))
        .route("/rankings/scores", get(handlers::ranking_scores));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::prometheus_metrics))
        .nest("/api/v1", v1)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// `?limit=` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

impl LimitQuery {
    /// The requested limit, defaulted and bounded.
    pub fn resolve(&self) -> Result<usize> {
        match self.limit {
            None => Ok(DEFAULT_LIMIT),
            Some(limit) if limit > MAX_LIMIT => Err(Mi8Error::validation(format!(
                "limit must be at most {}",
                MAX_LIMIT
            ))
            .with_context("limit", limit)),
            Some(limit) => Ok(limit),
        }
    }
}

/// Success envelope. Errors are rendered by [`crate::error::ErrorResponse`]
/// as `{success: false, error: {code, numeric_code, message, ...}}`.
#[derive(serde::Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: serde::Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_limit_defaults_and_bounds() {
        assert_eq!(LimitQuery::default().resolve().unwrap(), DEFAULT_LIMIT);
        assert_eq!(LimitQuery { limit: Some(0) }.resolve().unwrap(), 0);
        assert_eq!(LimitQuery { limit: Some(MAX_LIMIT) }.resolve().unwrap(), MAX_LIMIT);

        let err = LimitQuery { limit: Some(MAX_LIMIT + 1) }.resolve().unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }
}
