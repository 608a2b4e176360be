//! Shared types for the API layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::core_state::CoreState;
use crate::models::{MicrophonePermission, Severity, Theme, TimeSpan};

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self::with_limiter(core, RateLimiter::new())
    }

    pub fn with_limiter(core: Arc<CoreState>, limiter: RateLimiter) -> Self {
        Self {
            core,
            rate_limiter: Arc::new(Mutex::new(limiter)),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Request / response bodies
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct CreatedSession<V> {
    pub id: uuid::Uuid,
    #[serde(flatten)]
    pub view: V,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub category: String,
}

/// Partial edit of the open detail modal.
#[derive(Debug, Deserialize)]
pub struct DetailRequest {
    #[serde(default)]
    pub duration: Option<TimeSpan>,
    #[serde(default)]
    pub severity: Option<Severity>,
}

#[derive(Debug, Deserialize)]
pub struct VoiceStartRequest {
    pub microphone: MicrophonePermission,
}

/// One relayed recorder chunk, base64-encoded.
#[derive(Debug, Deserialize)]
pub struct VoiceChunkRequest {
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct VoiceErrorRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    pub theme: Theme,
}

// ═══════════════════════════════════════════════════════════
// Rate limiter: per-client sliding window
// ═══════════════════════════════════════════════════════════

/// Per-client rate limiter with per-minute and per-hour limits.
pub struct RateLimiter {
    windows: HashMap<String, Vec<Instant>>,
    per_minute: u32,
    per_hour: u32,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(120, 2000)
    }

    pub fn with_limits(per_minute: u32, per_hour: u32) -> Self {
        Self {
            windows: HashMap::new(),
            per_minute,
            per_hour,
        }
    }

    /// Check if a client is within rate limits. Returns `Ok(())` or
    /// `Err(retry_after_secs)` if exceeded.
    pub fn check(&mut self, client: &str) -> Result<(), u64> {
        let now = Instant::now();
        if self.windows.len() > 10_000 {
            self.windows
                .retain(|_, e| e.last().is_some_and(|ts| now.duration_since(*ts) < Duration::from_secs(3600)));
        }
        let entries = self.windows.entry(client.to_string()).or_default();

        entries.retain(|ts| now.duration_since(*ts) < Duration::from_secs(3600));

        let last_minute = entries
            .iter()
            .filter(|ts| now.duration_since(**ts) < Duration::from_secs(60))
            .count() as u32;
        if last_minute >= self.per_minute {
            return Err(60);
        }

        if entries.len() as u32 >= self.per_hour {
            return Err(3600);
        }

        entries.push(now);
        Ok(())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
