//! Per-visitor light/dark theme.

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ThemeResponse};

/// `GET /api/intake/:id/theme`
pub async fn current(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ThemeResponse>, ApiError> {
    let theme = ctx.core.with_session(id, |s| s.theme())?;
    Ok(Json(ThemeResponse { theme }))
}

/// `POST /api/intake/:id/theme`: flips light/dark.
pub async fn toggle(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ThemeResponse>, ApiError> {
    let theme = ctx.core.with_session(id, |s| s.toggle_theme())?;
    tracing::debug!(session_id = %id, %theme, "Theme toggled");
    Ok(Json(ThemeResponse { theme }))
}
