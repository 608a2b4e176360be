//! HTTP clients for the external collaborators: condition prediction,
//! speech-to-text and medicine-image lookup.
//!
//! All three are called from the service, never from the browser, so the
//! credentials in `ServiceConfig` stay server-side.

pub mod medicine;
pub mod prediction;
pub mod speech;

use std::time::Duration;

pub use medicine::{LookupRequest, MedicineLookup, MedicineLookupClient};
pub use prediction::PredictionClient;
pub use speech::SpeechClient;

/// Errors from calls to external services.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Cannot connect to {0}")]
    Connection(String),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("API error: {status}")]
    Status { status: u16, body: String },
    #[error("Malformed response: {0}")]
    Parse(String),
    #[error("HTTP client error: {0}")]
    Http(String),
    #[error("{0}")]
    Service(String),
    #[error("No speech detected")]
    NoSpeech,
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, RemoteError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .timeout(timeout)
        .build()
        .map_err(|e| RemoteError::Http(e.to_string()))
}

/// Maps a transport failure the way every client reports it.
///
/// The request URL is stripped: it can carry an API key in its query.
pub(crate) fn map_send_error(err: reqwest::Error, target: &str, timeout: Duration) -> RemoteError {
    if err.is_connect() {
        RemoteError::Connection(target.to_string())
    } else if err.is_timeout() {
        RemoteError::Timeout(timeout.as_secs())
    } else {
        RemoteError::Http(err.without_url().to_string())
    }
}

/// Rejects non-2xx responses, keeping the status code in the error.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), "Upstream returned an error status");
    Err(RemoteError::Status {
        status: status.as_u16(),
        body,
    })
}
