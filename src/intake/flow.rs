//! Network round trips for an intake session.
//!
//! Each flow snapshots what it needs under the session lock, awaits the
//! remote call with the lock released, then re-locks to apply the outcome.
//! An `InFlight` guard restores the session if the future is dropped
//! before it completes (client disconnect, task abort).

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::session::IntakeSession;
use super::SessionView;
use crate::core_state::{CoreError, CoreState};

// ═══════════════════════════════════════════════════════════
// InFlight: RAII reset for abandoned requests
// ═══════════════════════════════════════════════════════════

/// Runs `on_abandon` against the session unless `complete` was called.
struct InFlight {
    core: Arc<CoreState>,
    session_id: Uuid,
    on_abandon: fn(&mut IntakeSession),
    armed: bool,
}

impl InFlight {
    fn new(core: Arc<CoreState>, session_id: Uuid, on_abandon: fn(&mut IntakeSession)) -> Self {
        Self {
            core,
            session_id,
            on_abandon,
            armed: true,
        }
    }

    fn complete(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!(session_id = %self.session_id, "Request abandoned before completion");
            // The session may already be gone.
            let _ = self.core.with_session(self.session_id, self.on_abandon);
        }
    }
}

/// Sends the selected symptoms to the prediction backend and records the
/// result or error on the session.
pub async fn submit(core: Arc<CoreState>, session_id: Uuid) -> Result<SessionView, CoreError> {
    let symptom_text = core.with_session(session_id, |s| s.begin_submission())??;
    let guard = InFlight::new(core.clone(), session_id, IntakeSession::abort_submission);

    tracing::info!(session_id = %session_id, "Submitting symptoms for analysis");
    let outcome = core.prediction().predict(&symptom_text).await;
    if let Err(e) = &outcome {
        tracing::warn!(session_id = %session_id, error = %e, "Prediction failed");
    }

    guard.complete();
    core.with_session(session_id, |s| {
        s.finish_submission(outcome);
        s.view(Utc::now())
    })
}

/// Ends the relayed recording and, when audio was captured, transcribes it.
pub async fn transcribe(core: Arc<CoreState>, session_id: Uuid) -> Result<SessionView, CoreError> {
    let clip = core.with_session(session_id, |s| s.stop_voice())??;
    let Some(clip) = clip else {
        return core.with_session(session_id, |s| s.view(Utc::now()));
    };
    let guard = InFlight::new(core.clone(), session_id, IntakeSession::abort_transcription);

    tracing::debug!(session_id = %session_id, bytes = clip.len(), "Transcribing voice clip");
    let outcome = core.speech().transcribe(&clip).await;

    guard.complete();
    core.with_session(session_id, |s| {
        s.finish_transcription(outcome);
        s.view(Utc::now())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::intake::{Panel, WizardState};
    use crate::models::MicrophonePermission;
    use crate::remote::test_support::serve;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;
    use std::time::Duration;

    fn core_with(config: ServiceConfig) -> Arc<CoreState> {
        Arc::new(CoreState::new(config).unwrap())
    }

    fn reviewing(core: &CoreState) -> Uuid {
        let id = core.create_session().unwrap();
        core.with_session(id, |s| {
            s.toggle_symptom("2").unwrap();
            s.confirm_detail().unwrap();
            s.continue_to_review(Utc::now()).unwrap();
        })
        .unwrap();
        id
    }

    async fn predict_server(router_handler: Router) -> ServiceConfig {
        let base = serve(router_handler).await;
        ServiceConfig {
            predict_base_url: base,
            ..ServiceConfig::default()
        }
    }

    #[tokio::test]
    async fn successful_submission_renders_result() {
        let config = predict_server(Router::new().route(
            "/api/predict/predict",
            post(|| async {
                Json(json!({"matches": [{
                    "prediction": "Flu", "confidence": 0.82,
                    "medicines": ["Paracetamol"], "dosages": ["500mg"], "prices": ["20"]
                }]}))
            }),
        ))
        .await;
        let core = core_with(config);
        let id = reviewing(&core);

        let view = submit(core.clone(), id).await.unwrap();
        let Some(Panel::Result(result)) = view.panel else {
            panic!("expected result panel");
        };
        assert_eq!(result.condition, "Flu");
        assert_eq!(result.confidence_label, "82.0% confidence");
        let row = &result.medications[0];
        assert_eq!(
            format!("{} / {} / {}", row.medicine, row.dosage, row.price),
            "Paracetamol / 500mg / ₹20"
        );
        assert_eq!(result.medications.len(), 1);
    }

    #[tokio::test]
    async fn server_error_keeps_selection_and_reports_status() {
        let config = predict_server(Router::new().route(
            "/api/predict/predict",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        ))
        .await;
        let core = core_with(config);
        let id = reviewing(&core);

        let view = submit(core.clone(), id).await.unwrap();
        assert!(view.error.as_deref().unwrap().contains("500"));
        assert!(!view.submitting);
        assert!(!matches!(view.panel, Some(Panel::Result(_))));
        assert_eq!(view.selected.len(), 1);
        assert_eq!(view.selected[0].name, "Fever");
    }

    #[tokio::test]
    async fn submit_requires_review_step() {
        let core = core_with(ServiceConfig::default());
        let id = core.create_session().unwrap();
        let err = submit(core.clone(), id).await.unwrap_err();
        assert!(matches!(err, CoreError::Intake(_)));
    }

    #[tokio::test]
    async fn abandoned_submission_leaves_submitting() {
        let config = predict_server(Router::new().route(
            "/api/predict/predict",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Json(json!({"matches": []}))
            }),
        ))
        .await;
        let core = core_with(config);
        let id = reviewing(&core);

        let task = tokio::spawn(submit(core.clone(), id));
        for _ in 0..100 {
            let submitting = core.with_session(id, |s| s.state().is_submitting()).unwrap();
            if submitting {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        task.abort();
        let _ = task.await;

        let state = core.with_session(id, |s| s.state().clone()).unwrap();
        assert!(matches!(state, WizardState::Error(_)));
    }

    #[tokio::test]
    async fn response_for_removed_session_is_dropped() {
        let config = predict_server(Router::new().route(
            "/api/predict/predict",
            post(|| async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Json(json!({"matches": []}))
            }),
        ))
        .await;
        let core = core_with(config);
        let id = reviewing(&core);

        let task = tokio::spawn(submit(core.clone(), id));
        tokio::time::sleep(Duration::from_millis(20)).await;
        core.remove_session(id).unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, CoreError::SessionNotFound));
        assert_eq!(core.session_count(), 0);
    }

    #[tokio::test]
    async fn transcript_becomes_query() {
        let base = serve(Router::new().route(
            "/recognize",
            post(|| async {
                Json(json!({"results": [{"alternatives": [{"transcript": "cough"}]}]}))
            }),
        ))
        .await;
        let core = core_with(ServiceConfig {
            speech_endpoint: format!("{base}/recognize"),
            speech_api_key: Some("k".into()),
            ..ServiceConfig::default()
        });
        let id = core.create_session().unwrap();
        core.with_session(id, |s| {
            s.start_voice(MicrophonePermission::Granted).unwrap();
            s.push_voice_chunk(vec![7, 7, 7]).unwrap();
        })
        .unwrap();

        let view = transcribe(core.clone(), id).await.unwrap();
        assert_eq!(view.query, "cough");
        assert_eq!(view.voice.transcript.as_deref(), Some("cough"));
        assert!(!view.voice.transcribing);
    }

    #[tokio::test]
    async fn empty_recording_skips_transcription() {
        let core = core_with(ServiceConfig::default());
        let id = core.create_session().unwrap();
        core.with_session(id, |s| s.start_voice(MicrophonePermission::Granted))
            .unwrap()
            .unwrap();

        let view = transcribe(core.clone(), id).await.unwrap();
        assert!(view.voice.error.is_some());
        assert!(!view.voice.recording);
    }

    #[tokio::test]
    async fn missing_speech_key_surfaces_voice_error() {
        let core = core_with(ServiceConfig::default());
        let id = core.create_session().unwrap();
        core.with_session(id, |s| {
            s.start_voice(MicrophonePermission::Granted).unwrap();
            s.push_voice_chunk(vec![1]).unwrap();
        })
        .unwrap();

        let view = transcribe(core.clone(), id).await.unwrap();
        assert_eq!(
            view.voice.error.as_deref(),
            Some("Failed to transcribe audio. Please try again.")
        );
        assert_eq!(view.query, "");
    }
}
