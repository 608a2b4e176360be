use std::time::Duration;

use super::{build_http_client, ensure_success, map_send_error, RemoteError};
use crate::models::{PredictionMatch, PredictionRequest, PredictionResponse};

/// Client for the symptom-to-condition prediction backend.
#[derive(Clone)]
pub struct PredictionClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl PredictionClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_http_client(timeout)?,
            timeout,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/predict/predict", self.base_url)
    }

    /// Sends the joined symptom names and returns the ranked matches.
    pub async fn predict(&self, symptom_text: &str) -> Result<Vec<PredictionMatch>, RemoteError> {
        let url = self.endpoint();
        let started = std::time::Instant::now();

        let response = self
            .client
            .post(&url)
            .json(&PredictionRequest { symptom_text })
            .send()
            .await
            .map_err(|e| map_send_error(e, &self.base_url, self.timeout))?;

        let response = ensure_success(response).await?;
        let parsed: PredictionResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.without_url().to_string()))?;

        tracing::info!(
            matches = parsed.matches.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Prediction received"
        );
        Ok(parsed.matches)
    }
}
