//! JSON snapshot of an intake session, rendered by the browser.

use serde::Serialize;

use super::state::Step;
use crate::models::{PredictionMatch, SelectedSymptom, Severity, Symptom, Theme, TimeSpan};

/// Medication rows shown in the result table.
pub const RESULT_ROWS: usize = 3;

const MISSING: &str = "N/A";

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub step: Step,
    pub stage: &'static str,
    pub progress: u8,
    pub theme: Theme,
    pub query: String,
    pub categories: Vec<CategoryView>,
    pub selected: Vec<SelectedView>,
    pub max_selected: usize,
    pub can_continue: bool,
    pub detail: Option<DetailView>,
    /// Present only on step 2: either the review list or the result.
    pub panel: Option<Panel>,
    pub submitting: bool,
    pub can_submit: bool,
    pub error: Option<String>,
    pub status_message: Option<String>,
    pub notice: Option<String>,
    pub voice: VoiceView,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub category: String,
    pub expanded: bool,
    pub symptoms: Vec<SymptomOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymptomOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
    /// False when the control must be disabled (cap reached).
    pub selectable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectedView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub duration: TimeSpan,
    pub severity: Severity,
    pub severity_label: &'static str,
    pub severity_color: &'static str,
}

impl From<&SelectedSymptom> for SelectedView {
    fn from(s: &SelectedSymptom) -> Self {
        let level = s.severity.level();
        Self {
            id: s.symptom.id.clone(),
            name: s.symptom.name.clone(),
            category: s.symptom.category.clone(),
            duration: s.duration,
            severity: s.severity,
            severity_label: level.as_str(),
            severity_color: level.color_scale(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    pub symptom: Symptom,
    pub duration: TimeSpan,
    pub severity: Severity,
    pub severity_label: &'static str,
    pub severity_color: &'static str,
    pub durations: &'static [TimeSpan],
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Panel {
    Review(ReviewView),
    Result(ResultView),
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    pub symptom_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub condition: String,
    pub confidence: f64,
    pub confidence_label: String,
    pub based_on: String,
    pub medications: Vec<MedicationRow>,
    pub disclaimer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MedicationRow {
    pub medicine: String,
    pub dosage: String,
    pub price: String,
}

impl ResultView {
    /// Top match's condition and confidence, plus the first recommendation
    /// of each of the first three matches. `None` when there are no matches.
    pub fn from_matches(matches: &[PredictionMatch], based_on: &str, disclaimer: &str) -> Option<Self> {
        let top = matches.first()?;
        let medications = matches
            .iter()
            .take(RESULT_ROWS)
            .map(|m| MedicationRow {
                medicine: first_or_missing(&m.medicines),
                dosage: first_or_missing(&m.dosages),
                price: m
                    .prices
                    .first()
                    .map(|p| format!("₹{p}"))
                    .unwrap_or_else(|| MISSING.to_string()),
            })
            .collect();

        Some(Self {
            condition: top.prediction.clone(),
            confidence: top.confidence,
            confidence_label: format!("{:.1}% confidence", top.confidence * 100.0),
            based_on: based_on.to_string(),
            medications,
            disclaimer: disclaimer.to_string(),
        })
    }
}

fn first_or_missing(values: &[String]) -> String {
    values
        .first()
        .cloned()
        .unwrap_or_else(|| MISSING.to_string())
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceView {
    pub recording: bool,
    pub transcribing: bool,
    pub transcript: Option<String>,
    pub error: Option<String>,
}
