//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub active_sessions: usize,
    pub catalog_size: usize,
    pub speech_configured: bool,
}

/// `GET /api/health`: liveness plus a few counters.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        active_sessions: ctx.core.session_count(),
        catalog_size: ctx.core.catalog().len(),
        speech_configured: ctx.core.speech().is_configured(),
    }))
}
