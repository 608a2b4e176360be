use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "medi-intake";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local development prediction backend.
pub const DEFAULT_PREDICT_BASE_URL: &str = "http://localhost:5001";
pub const DEFAULT_SPEECH_ENDPOINT: &str = "https://speech.googleapis.com/v1/speech:recognize";
pub const DEFAULT_LOOKUP_BASE_URL: &str =
    "https://pocketpharma-backend.shubhamvishwakarma0604.workers.dev";
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> String {
    "medi_intake=info,tower_http=warn".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Runtime configuration. Credentials for the third-party services live
/// here and are never sent to the browser.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub predict_base_url: String,
    pub speech_endpoint: String,
    pub speech_api_key: Option<String>,
    pub lookup_base_url: String,
    pub catalog_path: Option<PathBuf>,
    pub http_timeout: Duration,
    pub session_ttl: Duration,
    pub notice_ttl: Duration,
    pub max_image_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            predict_base_url: DEFAULT_PREDICT_BASE_URL.to_string(),
            speech_endpoint: DEFAULT_SPEECH_ENDPOINT.to_string(),
            speech_api_key: None,
            lookup_base_url: DEFAULT_LOOKUP_BASE_URL.to_string(),
            catalog_path: None,
            http_timeout: Duration::from_secs(30),
            session_ttl: Duration::from_secs(30 * 60),
            notice_ttl: Duration::from_secs(3),
            max_image_bytes: 8 * 1024 * 1024,
        }
    }
}

impl ServiceConfig {
    /// Build from `MEDI_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(bind) = get("MEDI_BIND") {
            config.bind = bind.parse().map_err(|_| ConfigError::InvalidValue {
                var: "MEDI_BIND",
                value: bind.clone(),
            })?;
        }
        if let Some(url) = get("MEDI_PREDICT_BASE_URL") {
            config.predict_base_url = url;
        }
        if let Some(url) = get("MEDI_SPEECH_ENDPOINT") {
            config.speech_endpoint = url;
        }
        config.speech_api_key = get("MEDI_SPEECH_API_KEY");
        if let Some(url) = get("MEDI_LOOKUP_BASE_URL") {
            config.lookup_base_url = url;
        }
        config.catalog_path = get("MEDI_CATALOG_PATH").map(PathBuf::from);

        if let Some(secs) = parse_u64(&get, "MEDI_HTTP_TIMEOUT_SECS")? {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    var: "MEDI_HTTP_TIMEOUT_SECS",
                    value: secs.to_string(),
                });
            }
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_u64(&get, "MEDI_SESSION_TTL_SECS")? {
            config.session_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_u64(&get, "MEDI_NOTICE_TTL_SECS")? {
            config.notice_ttl = Duration::from_secs(secs);
        }
        if let Some(bytes) = parse_u64(&get, "MEDI_MAX_IMAGE_BYTES")? {
            config.max_image_bytes = bytes as usize;
        }

        Ok(config)
    }
}

fn parse_u64<G>(get: &G, var: &'static str) -> Result<Option<u64>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
    }
}
