//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core_state::CoreError;
use crate::intake::IntakeError;
use crate::remote::RemoteError;
use crate::voice::VoiceError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Rate limit exceeded")]
    RateLimited { retry_after: u64 },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::RateLimited { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                format!("Rate limit exceeded. Retry after {retry_after}s"),
            ),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail.clone()),
            ApiError::Upstream(detail) => (StatusCode::BAD_GATEWAY, "UPSTREAM", detail.clone()),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        let mut response = (status, Json(body)).into_response();
        if let ApiError::RateLimited { retry_after } = &self {
            if let Ok(val) = axum::http::HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert("Retry-After", val);
            }
        }
        response
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::UnknownSymptom(_)
            | IntakeError::UnknownCategory(_)
            | IntakeError::NotSelected(_) => ApiError::NotFound(err.to_string()),
            IntakeError::NothingSelected
            | IntakeError::Voice(VoiceError::ClipTooLarge { .. }) => {
                ApiError::BadRequest(err.to_string())
            }
            IntakeError::SelectionFull(_)
            | IntakeError::InvalidTransition { .. }
            | IntakeError::AlreadySubmitting
            | IntakeError::Voice(_) => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<RemoteError> for ApiError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::NotConfigured(_) => ApiError::Internal(err.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SessionNotFound => ApiError::NotFound("Intake session not found".into()),
            CoreError::LockPoisoned => ApiError::Internal("lock poisoned".into()),
            CoreError::Catalog(e) => ApiError::Internal(e.to_string()),
            CoreError::Remote(e) => e.into(),
            CoreError::Intake(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn json_of(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn rate_limited_returns_429_with_retry_after() {
        let response = ApiError::RateLimited { retry_after: 60 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "60");
        assert_eq!(json_of(response).await["error"]["code"], "RATE_LIMITED");
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let response = ApiError::Internal("something broke".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_of(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn selection_full_is_a_conflict() {
        let api: ApiError = IntakeError::SelectionFull(4).into();
        let response = api.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = json_of(response).await;
        assert_eq!(json["error"]["code"], "CONFLICT");
        assert_eq!(json["error"]["message"], "At most 4 symptoms can be selected");
    }

    #[tokio::test]
    async fn nothing_selected_is_bad_request_with_copy() {
        let api: ApiError = IntakeError::NothingSelected.into();
        let response = api.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_of(response).await;
        assert_eq!(json["error"]["message"], "Please select at least one symptom");
    }

    #[tokio::test]
    async fn oversized_recording_is_bad_request() {
        let api: ApiError = IntakeError::Voice(VoiceError::ClipTooLarge { limit: 8 }).into();
        assert_eq!(api.into_response().status(), StatusCode::BAD_REQUEST);

        let api: ApiError = IntakeError::Voice(VoiceError::Busy).into();
        assert_eq!(api.into_response().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn missing_session_is_404() {
        let api: ApiError = CoreError::SessionNotFound.into();
        assert_eq!(api.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn remote_failure_is_502() {
        let api: ApiError = CoreError::Remote(RemoteError::Service("Image too blurry".into())).into();
        let response = api.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = json_of(response).await;
        assert_eq!(json["error"]["code"], "UPSTREAM");
        assert_eq!(json["error"]["message"], "Image too blurry");
    }
}
