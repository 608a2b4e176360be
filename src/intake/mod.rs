//! Symptom intake workflow.
//!
//! One `IntakeSession` per visitor holds the search query, category
//! expansion, the selected symptoms and a single `WizardState`. Every
//! user action is a synchronous method on the session; the two network
//! round trips (prediction and transcription) are split into
//! begin/finish halves and driven by `flow`, which never holds the
//! session lock across an await.

pub mod flow;
pub mod session;
pub mod state;
pub mod text;
pub mod view;

pub use session::IntakeSession;
pub use state::{progress_percentage, PendingDetail, Step, WizardState};
pub use text::{IntakeSettings, IntakeText};
pub use view::{Panel, ResultView, SessionView};

use crate::voice::VoiceError;

/// Selected-set cap.
pub const MAX_SELECTED: usize = 4;

/// Rejected user actions. The session is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("Unknown symptom: {0}")]
    UnknownSymptom(String),
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("At most {0} symptoms can be selected")]
    SelectionFull(usize),
    #[error("Please select at least one symptom")]
    NothingSelected,
    #[error("Symptom {0} is not selected")]
    NotSelected(String),
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error("An analysis is already in progress")]
    AlreadySubmitting,
    #[error(transparent)]
    Voice(#[from] VoiceError),
}
