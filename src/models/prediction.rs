use serde::{Deserialize, Serialize};

/// One ranked match from the prediction backend. `medicines`, `dosages`
/// and `prices` are index-aligned: entry `i` of each describes one
/// recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionMatch {
    #[serde(alias = "disease")]
    pub prediction: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub medicines: Vec<String>,
    #[serde(default)]
    pub dosages: Vec<String>,
    #[serde(rename = "prices_inr", alias = "prices", default)]
    pub prices: Vec<String>,
}

/// Body returned by `POST /api/predict/predict`.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionResponse {
    pub matches: Vec<PredictionMatch>,
}

/// Body sent to `POST /api/predict/predict`.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest<'a> {
    pub symptom_text: &'a str,
}
