use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{build_http_client, ensure_success, map_send_error, RemoteError};
use crate::voice::AudioClip;

const ENCODING: &str = "WEBM_OPUS";
const SAMPLE_RATE_HERTZ: u32 = 16_000;
const LANGUAGE_CODE: &str = "en-US";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig {
    encoding: &'static str,
    sample_rate_hertz: u32,
    language_code: &'static str,
}

#[derive(Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Serialize)]
struct RecognizeRequest {
    config: RecognitionConfig,
    audio: RecognitionAudio,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognizeResult>,
}

#[derive(Deserialize)]
struct RecognizeResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

/// Speech-to-text client. The API key is server configuration.
#[derive(Clone)]
pub struct SpeechClient {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
    timeout: Duration,
}

impl SpeechClient {
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        Ok(Self {
            endpoint: endpoint.to_string(),
            api_key,
            client: build_http_client(timeout)?,
            timeout,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Transcribes one clip. A reply without a first transcript
    /// alternative is `RemoteError::NoSpeech`.
    pub async fn transcribe(&self, clip: &AudioClip) -> Result<String, RemoteError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(RemoteError::NotConfigured("Speech-to-text"))?;

        let body = RecognizeRequest {
            config: RecognitionConfig {
                encoding: ENCODING,
                sample_rate_hertz: SAMPLE_RATE_HERTZ,
                language_code: LANGUAGE_CODE,
            },
            audio: RecognitionAudio {
                content: clip.to_base64(),
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| map_send_error(e, &self.endpoint, self.timeout))?;

        let response = ensure_success(response).await?;
        let parsed: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.without_url().to_string()))?;

        let transcript = parsed
            .results
            .into_iter()
            .next()
            .and_then(|r| r.alternatives.into_iter().next())
            .map(|a| a.transcript)
            .filter(|t| !t.trim().is_empty())
            .ok_or(RemoteError::NoSpeech)?;

        tracing::debug!(chars = transcript.len(), "Transcript received");
        Ok(transcript)
    }
}
