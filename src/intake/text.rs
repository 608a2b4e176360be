use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::SymptomCatalog;

/// User-facing copy for the intake flow. Deployments may override any
/// string; the defaults are the product's English copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeText {
    pub no_selection: String,
    pub analysis_complete: String,
    pub submission_failed: String,
    pub no_matches: String,
    pub submission_interrupted: String,
    pub microphone_denied: String,
    pub no_transcript: String,
    pub transcription_failed: String,
    pub disclaimer: String,
}

impl Default for IntakeText {
    fn default() -> Self {
        Self {
            no_selection: "Please select at least one symptom".into(),
            analysis_complete: "Analysis complete!".into(),
            submission_failed: "An error occurred. Please try again.".into(),
            no_matches: "No matching conditions were found. Please try different symptoms.".into(),
            submission_interrupted: "The analysis was interrupted. Please try again.".into(),
            microphone_denied: "Failed to access microphone. Please allow microphone access."
                .into(),
            no_transcript: "No transcription available. Please try speaking again.".into(),
            transcription_failed: "Failed to transcribe audio. Please try again.".into(),
            disclaimer: "This is an AI-generated assessment and should not replace professional medical advice.".into(),
        }
    }
}

/// Everything an intake session is parameterised by.
#[derive(Debug, Clone)]
pub struct IntakeSettings {
    pub catalog: Arc<SymptomCatalog>,
    pub text: IntakeText,
    pub notice_ttl: chrono::Duration,
}

impl IntakeSettings {
    pub fn new(catalog: SymptomCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            text: IntakeText::default(),
            notice_ttl: chrono::Duration::seconds(3),
        }
    }
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self::new(SymptomCatalog::builtin())
    }
}
