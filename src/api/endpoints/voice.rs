//! Voice-assisted search endpoints.
//!
//! The browser owns the microphone and relays recorder events: the
//! permission result on start, each data chunk, then stop. Stop runs the
//! speech-to-text call server-side and returns the updated view.

use axum::extract::{Path, State};
use axum::Json;
use base64::Engine;
use uuid::Uuid;

use super::intake::act;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, VoiceChunkRequest, VoiceErrorRequest, VoiceStartRequest};
use crate::intake::{flow, SessionView};

/// `POST /api/intake/:id/voice/start`
pub async fn start(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<VoiceStartRequest>,
) -> Result<Json<SessionView>, ApiError> {
    tracing::debug!(session_id = %id, microphone = %body.microphone, "Voice start");
    act(&ctx, id, |s| s.start_voice(body.microphone))
}

/// `POST /api/intake/:id/voice/chunk`
pub async fn chunk(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<VoiceChunkRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(body.data.as_bytes())
        .map_err(|e| ApiError::BadRequest(format!("Invalid audio chunk: {e}")))?;
    act(&ctx, id, |s| s.push_voice_chunk(bytes))
}

/// `POST /api/intake/:id/voice/stop`
pub async fn stop(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let view = flow::transcribe(ctx.core.clone(), id).await?;
    Ok(Json(view))
}

/// `POST /api/intake/:id/voice/error`: recorder failed in the browser.
pub async fn report_error(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<VoiceErrorRequest>,
) -> Result<Json<SessionView>, ApiError> {
    tracing::warn!(session_id = %id, message = %body.message, "Recorder error relayed");
    act(&ctx, id, |s| {
        s.fail_voice(&body.message);
        Ok(())
    })
}

/// `DELETE /api/intake/:id/voice/error`
pub async fn dismiss_error(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    act(&ctx, id, |s| {
        s.dismiss_voice_error();
        Ok(())
    })
}
