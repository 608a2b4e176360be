//! Transport-agnostic application state.
//!
//! `CoreState` is shared by every request handler behind an `Arc`. It owns
//! the visitor sessions plus the outbound clients, so credentials from
//! `ServiceConfig` never leave the process. The session map sits behind a
//! std `RwLock`; callers mutate a session through `with_session` and must
//! not hold the guard across an await.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::catalog::{CatalogError, SymptomCatalog};
use crate::config::ServiceConfig;
use crate::intake::{IntakeError, IntakeSession, IntakeSettings};
use crate::remote::{MedicineLookupClient, PredictionClient, RemoteError, SpeechClient};

struct SessionEntry {
    session: IntakeSession,
    last_activity: Instant,
}

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    pub config: ServiceConfig,
    settings: Arc<IntakeSettings>,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    prediction: PredictionClient,
    speech: SpeechClient,
    lookup: MedicineLookupClient,
}

impl CoreState {
    /// Builds state from configuration, loading the catalog file when one
    /// is configured.
    pub fn new(config: ServiceConfig) -> Result<Self, CoreError> {
        let catalog = match &config.catalog_path {
            Some(path) => {
                let catalog = SymptomCatalog::from_json_file(path)?;
                tracing::info!(path = %path.display(), symptoms = catalog.len(), "Catalog loaded");
                catalog
            }
            None => SymptomCatalog::builtin(),
        };

        let mut settings = IntakeSettings::new(catalog);
        if let Ok(ttl) = chrono::Duration::from_std(config.notice_ttl) {
            settings.notice_ttl = ttl;
        }
        Self::with_settings(config, settings)
    }

    pub fn with_settings(config: ServiceConfig, settings: IntakeSettings) -> Result<Self, CoreError> {
        let prediction = PredictionClient::new(&config.predict_base_url, config.http_timeout)?;
        let speech = SpeechClient::new(
            &config.speech_endpoint,
            config.speech_api_key.clone(),
            config.http_timeout,
        )?;
        let lookup = MedicineLookupClient::new(&config.lookup_base_url, config.http_timeout)?;

        if !speech.is_configured() {
            tracing::warn!("No speech-to-text key configured, voice search will fail");
        }

        Ok(Self {
            config,
            settings: Arc::new(settings),
            sessions: RwLock::new(HashMap::new()),
            prediction,
            speech,
            lookup,
        })
    }

    pub fn settings(&self) -> &Arc<IntakeSettings> {
        &self.settings
    }

    pub fn catalog(&self) -> &SymptomCatalog {
        &self.settings.catalog
    }

    pub fn prediction(&self) -> &PredictionClient {
        &self.prediction
    }

    pub fn speech(&self) -> &SpeechClient {
        &self.speech
    }

    pub fn lookup(&self) -> &MedicineLookupClient {
        &self.lookup
    }

    // ── Session store ───────────────────────────────────────

    pub fn create_session(&self) -> Result<Uuid, CoreError> {
        let id = Uuid::new_v4();
        let entry = SessionEntry {
            session: IntakeSession::new(self.settings.clone()),
            last_activity: Instant::now(),
        };
        self.sessions
            .write()
            .map_err(|_| CoreError::LockPoisoned)?
            .insert(id, entry);
        tracing::debug!(session_id = %id, "Intake session created");
        Ok(id)
    }

    /// Runs `f` on the session under the write lock and marks it active.
    pub fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut IntakeSession) -> R,
    ) -> Result<R, CoreError> {
        let mut sessions = self.sessions.write().map_err(|_| CoreError::LockPoisoned)?;
        let entry = sessions.get_mut(&id).ok_or(CoreError::SessionNotFound)?;
        entry.last_activity = Instant::now();
        Ok(f(&mut entry.session))
    }

    pub fn remove_session(&self, id: Uuid) -> Result<bool, CoreError> {
        let removed = self
            .sessions
            .write()
            .map_err(|_| CoreError::LockPoisoned)?
            .remove(&id)
            .is_some();
        if removed {
            tracing::debug!(session_id = %id, "Intake session removed");
        }
        Ok(removed)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Drops sessions idle for longer than `ttl`. Returns how many went.
    pub fn prune_idle(&self, ttl: Duration) -> usize {
        let Ok(mut sessions) = self.sessions.write() else {
            return 0;
        };
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_activity.elapsed() < ttl);
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::info!(pruned, remaining = sessions.len(), "Idle intake sessions pruned");
        }
        pruned
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Intake session not found")]
    SessionNotFound,
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Intake(#[from] IntakeError),
}
