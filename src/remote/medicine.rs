use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{build_http_client, map_send_error, RemoteError};

const DEFAULT_FAILURE: &str = "Failed to find generic medicine";

/// Photo of a medicine package, as a data URL plus its mime type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupRequest {
    pub image: String,
    pub mime: String,
}

impl LookupRequest {
    /// Checks the upload before it is forwarded.
    pub fn validate(&self, max_bytes: usize) -> Result<(), String> {
        if !self.mime.starts_with("image/") {
            return Err(format!("Unsupported file type: {}", self.mime));
        }
        if !self.image.starts_with("data:") || !self.image.contains(";base64,") {
            return Err("Image must be a base64 data URL".into());
        }
        if self.image.len() > max_bytes {
            return Err(format!("Image exceeds {max_bytes} bytes"));
        }
        Ok(())
    }
}

/// Lookup reply split into the generic-name field and the brand
/// medicine's remaining attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicineLookup {
    pub generic_field: Option<String>,
    pub generic_name: Option<Value>,
    pub brand_attributes: Map<String, Value>,
}

impl MedicineLookup {
    /// Keys containing "generic" (any case) never count as brand
    /// attributes; the last one in document order is the generic field.
    pub fn from_attributes(attributes: Map<String, Value>) -> Self {
        let mut generic_field = None;
        let mut generic_name = None;
        let mut brand_attributes = Map::new();

        for (key, value) in attributes {
            if key.to_lowercase().contains("generic") {
                generic_field = Some(key);
                generic_name = Some(value);
            } else {
                brand_attributes.insert(key, value);
            }
        }

        Self {
            generic_field,
            generic_name,
            brand_attributes,
        }
    }
}

/// Parses the service reply: an object, usually JSON-encoded inside a
/// JSON string. An object carrying `message` is a service error.
pub fn parse_lookup_payload(payload: Value) -> Result<MedicineLookup, RemoteError> {
    let inner = match payload {
        Value::String(encoded) => serde_json::from_str::<Value>(&encoded)
            .map_err(|e| RemoteError::Parse(e.to_string()))?,
        other => other,
    };

    match inner {
        Value::Object(map) => {
            if let Some(message) = map.get("message") {
                let message = message.as_str().unwrap_or(DEFAULT_FAILURE).to_string();
                return Err(RemoteError::Service(message));
            }
            Ok(MedicineLookup::from_attributes(map))
        }
        _ => Err(RemoteError::Parse("expected a JSON object".into())),
    }
}

/// Client for the medicine-image lookup worker.
#[derive(Clone)]
pub struct MedicineLookupClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl MedicineLookupClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_http_client(timeout)?,
            timeout,
        })
    }

    pub async fn lookup(&self, request: &LookupRequest) -> Result<MedicineLookup, RemoteError> {
        let url = format!("{}/", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| map_send_error(e, &self.base_url, self.timeout))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RemoteError::Http(e.without_url().to_string()))?;
        let payload: Option<Value> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let message = payload
                .as_ref()
                .and_then(|v| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string);
            tracing::warn!(status = status.as_u16(), "Medicine lookup failed");
            return Err(match message {
                Some(message) => RemoteError::Service(message),
                None => RemoteError::Status {
                    status: status.as_u16(),
                    body: text,
                },
            });
        }

        let payload = payload.ok_or_else(|| RemoteError::Parse("response is not JSON".into()))?;
        parse_lookup_payload(payload)
    }
}
