use serde::Serialize;

use crate::models::{PredictionMatch, Severity, Symptom, TimeSpan};

/// Candidate symptom while the detail modal is open.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDetail {
    pub symptom: Symptom,
    pub duration: TimeSpan,
    pub severity: Severity,
}

impl PendingDetail {
    pub fn new(symptom: Symptom) -> Self {
        Self {
            symptom,
            duration: TimeSpan::default(),
            severity: Severity::default(),
        }
    }
}

/// Where the visitor is in the intake flow. One value at a time, so a
/// result and the review list can never be shown together.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WizardState {
    #[default]
    Selecting,
    DetailCapture(PendingDetail),
    Reviewing,
    Submitting,
    Result(Vec<PredictionMatch>),
    Error(String),
}

impl WizardState {
    pub fn step(&self) -> Step {
        match self {
            Self::Selecting | Self::DetailCapture(_) => Step::Select,
            _ => Step::Review,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Selecting => "selecting",
            Self::DetailCapture(_) => "detail_capture",
            Self::Reviewing => "reviewing",
            Self::Submitting => "submitting",
            Self::Result(_) => "result",
            Self::Error(_) => "error",
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Select,
    Review,
}

impl Step {
    pub fn number(self) -> u8 {
        match self {
            Self::Select => 1,
            Self::Review => 2,
        }
    }
}

impl Serialize for Step {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

/// Cosmetic progress bar value.
pub fn progress_percentage(step: Step, selected_count: usize, submitting: bool) -> u8 {
    match step {
        Step::Select => 15usize.saturating_mul(selected_count).saturating_add(25).min(95) as u8,
        Step::Review if submitting => 98,
        Step::Review => 95,
    }
}
