use serde::{Deserialize, Serialize};

use super::enums::{SeverityLevel, TimeSpan};
use super::ModelError;

/// Catalog entry. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symptom {
    pub id: String,
    pub name: String,
    pub category: String,
}

impl Symptom {
    pub fn new(id: &str, name: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
        }
    }
}

/// Symptom severity on the 1–10 slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Severity(u8);

impl Severity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;
    pub const DEFAULT: Severity = Severity(5);

    pub fn new(value: u8) -> Result<Self, ModelError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ModelError::SeverityOutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Canonical band mapping: 1–3 Mild, 4–6 Moderate, 7–10 Severe.
    pub fn level(self) -> SeverityLevel {
        match self.0 {
            0..=3 => SeverityLevel::Mild,
            4..=6 => SeverityLevel::Moderate,
            _ => SeverityLevel::Severe,
        }
    }

    pub fn label(self) -> &'static str {
        self.level().as_str()
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Severity {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.0
    }
}

/// Label for a raw slider value. Out-of-range input has no label.
pub fn severity_label(value: u8) -> Option<&'static str> {
    Severity::new(value).ok().map(Severity::label)
}

/// A catalog symptom with the details captured in the detail modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedSymptom {
    #[serde(flatten)]
    pub symptom: Symptom,
    pub duration: TimeSpan,
    pub severity: Severity,
}

impl SelectedSymptom {
    pub fn id(&self) -> &str {
        &self.symptom.id
    }

    pub fn name(&self) -> &str {
        &self.symptom.name
    }
}
