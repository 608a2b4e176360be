//! Symptom intake endpoints.
//!
//! - `POST /api/intake`: new session
//! - `GET|DELETE /api/intake/:id`
//! - selection, detail capture, navigation and submission under `/api/intake/:id/...`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CategoryRequest, CreatedSession, DetailRequest, QueryRequest};
use crate::intake::{flow, IntakeError, IntakeSession, SessionView};

/// Applies one session action and returns the resulting view.
pub(crate) fn act(
    ctx: &ApiContext,
    id: Uuid,
    action: impl FnOnce(&mut IntakeSession) -> Result<(), IntakeError>,
) -> Result<Json<SessionView>, ApiError> {
    let view = ctx.core.with_session(id, |s| {
        action(s)?;
        Ok::<_, IntakeError>(s.view(Utc::now()))
    })??;
    Ok(Json(view))
}

/// `POST /api/intake`
pub async fn create(
    State(ctx): State<ApiContext>,
) -> Result<(StatusCode, Json<CreatedSession<SessionView>>), ApiError> {
    let id = ctx.core.create_session()?;
    let view = ctx.core.with_session(id, |s| s.view(Utc::now()))?;
    Ok((StatusCode::CREATED, Json(CreatedSession { id, view })))
}

/// `GET /api/intake/:id`
pub async fn show(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    act(&ctx, id, |_| Ok(()))
}

/// `DELETE /api/intake/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if ctx.core.remove_session(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Intake session not found".into()))
    }
}

/// `PUT /api/intake/:id/query`
pub async fn set_query(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<QueryRequest>,
) -> Result<Json<SessionView>, ApiError> {
    act(&ctx, id, |s| {
        s.set_query(body.query);
        Ok(())
    })
}

/// `POST /api/intake/:id/categories/toggle`
pub async fn toggle_category(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<CategoryRequest>,
) -> Result<Json<SessionView>, ApiError> {
    act(&ctx, id, |s| s.toggle_category(&body.category).map(|_| ()))
}

/// `POST /api/intake/:id/symptoms/:symptom_id/toggle`
pub async fn toggle_symptom(
    State(ctx): State<ApiContext>,
    Path((id, symptom_id)): Path<(Uuid, String)>,
) -> Result<Json<SessionView>, ApiError> {
    act(&ctx, id, |s| s.toggle_symptom(&symptom_id))
}

/// `DELETE /api/intake/:id/symptoms/:symptom_id`
pub async fn remove_symptom(
    State(ctx): State<ApiContext>,
    Path((id, symptom_id)): Path<(Uuid, String)>,
) -> Result<Json<SessionView>, ApiError> {
    act(&ctx, id, |s| s.remove_symptom(&symptom_id))
}

/// `DELETE /api/intake/:id/symptoms`: "Clear all".
pub async fn clear_symptoms(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    act(&ctx, id, IntakeSession::clear_selection)
}

/// `PUT /api/intake/:id/detail`
pub async fn set_detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<DetailRequest>,
) -> Result<Json<SessionView>, ApiError> {
    act(&ctx, id, |s| s.set_detail(body.duration, body.severity))
}

/// `POST /api/intake/:id/detail/confirm`
pub async fn confirm_detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    act(&ctx, id, IntakeSession::confirm_detail)
}

/// `POST /api/intake/:id/detail/cancel`
pub async fn cancel_detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    act(&ctx, id, IntakeSession::cancel_detail)
}

/// `POST /api/intake/:id/review`: continue to step 2.
///
/// With nothing selected the session keeps a notice and the request
/// fails with the same copy.
pub async fn review(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    act(&ctx, id, |s| s.continue_to_review(Utc::now())).map_err(|e| match e {
        ApiError::BadRequest(_) => {
            ApiError::BadRequest(ctx.core.settings().text.no_selection.clone())
        }
        other => other,
    })
}

/// `POST /api/intake/:id/back`: "Back to Symptoms".
pub async fn back(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    act(&ctx, id, IntakeSession::back_to_selection)
}

/// `POST /api/intake/:id/submit`
///
/// Prediction failures are part of the returned view (error state),
/// not an HTTP error.
pub async fn submit(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let view = flow::submit(ctx.core.clone(), id).await?;
    Ok(Json(view))
}

/// `DELETE /api/intake/:id/notice`
pub async fn dismiss_notice(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    act(&ctx, id, |s| {
        s.dismiss_notice();
        Ok(())
    })
}
