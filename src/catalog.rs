//! Symptom catalog: the static reference list shown in the intake flow,
//! plus the search filter and category grouping applied on every keystroke.
//!
//! The catalog is injected configuration: the built-in list is used unless
//! a JSON file (array of `Symptom`) is supplied at startup.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::models::Symptom;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog is empty")]
    Empty,
    #[error("Duplicate symptom id: {0}")]
    DuplicateId(String),
    #[error("Symptom {0} has a blank name or category")]
    BlankField(String),
    #[error("Cannot read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed catalog file: {0}")]
    Parse(#[from] serde_json::Error),
}

// ═══════════════════════════════════════════
// Built-in catalog
// ═══════════════════════════════════════════

const BUILTIN: &[(&str, &str, &str)] = &[
    // General/Systemic
    ("1", "Fatigue", "General"),
    ("2", "Fever", "General"),
    ("3", "Chills", "General"),
    ("4", "Sweating", "General"),
    ("5", "Weight loss", "General"),
    ("6", "Weight gain", "General"),
    ("7", "Night sweats", "General"),
    ("8", "Rapid heartbeat", "General"),
    ("9", "High blood pressure", "General"),
    ("10", "High cholesterol", "General"),
    ("11", "Excess body weight", "General"),
    ("12", "Pale skin", "General"),
    ("13", "Jaundice (yellowing of skin/eyes)", "General"),
    ("14", "Dark urine", "General"),
    // Head/Neurological
    ("15", "Headache", "Neurological"),
    ("16", "Dizziness", "Neurological"),
    ("17", "Blurred vision", "Neurological"),
    ("18", "Sensitivity to light", "Neurological"),
    ("19", "Memory loss", "Neurological"),
    ("20", "Confusion", "Neurological"),
    ("21", "Difficulty in thinking", "Neurological"),
    ("22", "Seizures", "Neurological"),
    ("23", "Temporary unconsciousness", "Neurological"),
    ("24", "Tremors", "Neurological"),
    ("25", "Slow movement", "Neurological"),
    ("26", "Balance issues", "Neurological"),
    ("27", "Hallucinations", "Neurological"),
    ("28", "Delusions", "Neurological"),
    ("29", "Disorganized speech", "Neurological"),
    // Respiratory
    ("30", "Shortness of breath", "Respiratory"),
    ("31", "Wheezing", "Respiratory"),
    ("32", "Chest tightness", "Respiratory"),
    ("33", "Cough (with or without mucus)", "Respiratory"),
    ("34", "Nasal congestion", "Respiratory"),
    ("35", "Runny nose", "Respiratory"),
    ("36", "Sneezing", "Respiratory"),
    ("37", "Sore throat", "Respiratory"),
    ("38", "Loss of taste/smell", "Respiratory"),
    ("39", "Ear pain", "Respiratory"),
    ("40", "Hearing loss", "Respiratory"),
    ("41", "Fluid drainage from ear", "Respiratory"),
    // Digestive/Abdominal
    ("42", "Nausea", "Digestive"),
    ("43", "Vomiting", "Digestive"),
    ("44", "Abdominal pain", "Digestive"),
    ("45", "Stomach pain", "Digestive"),
    ("46", "Bloating", "Digestive"),
    ("47", "Burning stomach pain", "Digestive"),
    ("48", "Loss of appetite", "Digestive"),
    ("49", "Diarrhea", "Digestive"),
    ("50", "Constipation", "Digestive"),
    ("51", "Painful urination", "Digestive"),
    ("52", "Discharge", "Digestive"),
    ("53", "Dark urine", "Digestive"),
    // Musculoskeletal
    ("54", "Joint pain", "Musculoskeletal"),
    ("55", "Joint stiffness", "Musculoskeletal"),
    ("56", "Joint swelling", "Musculoskeletal"),
    ("57", "Muscle aches", "Musculoskeletal"),
    ("58", "Generalized pain", "Musculoskeletal"),
    ("59", "Facial pain", "Musculoskeletal"),
    // Skin/Allergic
    ("60", "Rash", "Dermatological"),
    ("61", "Itching", "Dermatological"),
    ("62", "Red eyes", "Dermatological"),
    ("63", "Eye discharge", "Dermatological"),
    ("64", "Scaly skin patches", "Dermatological"),
    ("65", "Dry/cracked skin", "Dermatological"),
    ("66", "Sores", "Dermatological"),
    ("67", "Swelling (edema)", "Dermatological"),
    // Cardiovascular
    ("68", "Chest pain", "Cardiovascular"),
    ("69", "Palpitations (rapid heartbeat)", "Cardiovascular"),
    ("70", "High blood pressure", "Cardiovascular"),
    // Urinary/Reproductive
    ("71", "Frequent urination", "Urinary"),
    ("72", "Painful urination", "Urinary"),
    ("73", "Discharge", "Urinary"),
    ("74", "Swelling (genital)", "Urinary"),
    ("75", "Lower abdominal pain", "Urinary"),
    // Psychological/Mental health
    ("76", "Persistent sadness", "Psychological"),
    ("77", "Lack of energy", "Psychological"),
    ("78", "Sleep issues", "Psychological"),
    ("79", "Excessive worry", "Psychological"),
    ("80", "Restlessness", "Psychological"),
    ("81", "Anxiety", "Psychological"),
    // Eye
    ("82", "Blurred vision", "Eye"),
    ("83", "Eye pain", "Eye"),
    ("84", "Red eyes", "Eye"),
    ("85", "Itching eyes", "Eye"),
    ("86", "Discharge from eyes", "Eye"),
    // ENT
    ("87", "Sore throat", "ENT"),
    ("88", "Ear pain", "ENT"),
    ("89", "Hearing loss", "ENT"),
    ("90", "Nasal congestion", "ENT"),
    ("91", "Runny nose", "ENT"),
    ("92", "Sneezing", "ENT"),
    ("93", "Loss of taste/smell", "ENT"),
    // Infectious clusters
    ("94", "Cough + fever + shortness of breath", "Infectious"),
    ("95", "Fever + joint pain + rash", "Infectious"),
    ("96", "Night sweats + weight loss + fever", "Infectious"),
];

// ═══════════════════════════════════════════
// View types
// ═══════════════════════════════════════════

/// Symptoms sharing a category, in catalog order.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub symptoms: Vec<&'a Symptom>,
}

// ═══════════════════════════════════════════
// SymptomCatalog
// ═══════════════════════════════════════════

/// Ordered, validated symptom list with unique ids.
#[derive(Debug, Clone)]
pub struct SymptomCatalog {
    symptoms: Vec<Symptom>,
}

impl SymptomCatalog {
    /// Validates and wraps an ordered symptom list.
    pub fn new(symptoms: Vec<Symptom>) -> Result<Self, CatalogError> {
        if symptoms.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for s in &symptoms {
            if s.name.trim().is_empty() || s.category.trim().is_empty() {
                return Err(CatalogError::BlankField(s.id.clone()));
            }
            if !seen.insert(s.id.as_str()) {
                return Err(CatalogError::DuplicateId(s.id.clone()));
            }
        }
        Ok(Self { symptoms })
    }

    pub fn builtin() -> Self {
        Self {
            symptoms: BUILTIN
                .iter()
                .map(|(id, name, category)| Symptom::new(id, name, category))
                .collect(),
        }
    }

    /// Loads a JSON array of symptoms from disk.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let symptoms: Vec<Symptom> = serde_json::from_str(&raw)?;
        Self::new(symptoms)
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Symptom> {
        self.symptoms.iter().find(|s| s.id == id)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for s in &self.symptoms {
            if !out.contains(&s.category.as_str()) {
                out.push(&s.category);
            }
        }
        out
    }

    /// Case-insensitive substring match on the symptom name.
    /// An empty query keeps everything.
    pub fn filter(&self, query: &str) -> Vec<&Symptom> {
        if query.is_empty() {
            return self.symptoms.iter().collect();
        }
        let needle = query.to_lowercase();
        self.symptoms
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// `filter` followed by `group_by_category`.
    pub fn search(&self, query: &str) -> Vec<CategoryGroup<'_>> {
        group_by_category(self.filter(query))
    }
}

impl Default for SymptomCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Groups symptoms by category, keeping first-seen category order and the
/// relative order of symptoms within each group.
pub fn group_by_category<'a>(symptoms: Vec<&'a Symptom>) -> Vec<CategoryGroup<'a>> {
    let mut groups: Vec<CategoryGroup<'a>> = Vec::new();
    for symptom in symptoms {
        match groups
            .iter_mut()
            .find(|g| g.category == symptom.category.as_str())
        {
            Some(group) => group.symptoms.push(symptom),
            None => groups.push(CategoryGroup {
                category: &symptom.category,
                symptoms: vec![symptom],
            }),
        }
    }
    groups
}
