use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use utoipa::ToSchema;

/// Acuity classification, declared from least to most urgent so that the
/// derived ordering makes `max` pick the more severe level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriageLevel {
    Blue,
    Green,
    Yellow,
    Orange,
    Red,
}

impl TriageLevel {
    /// Display priority, 1 = most urgent
    pub fn rank(self) -> u8 {
        match self {
            TriageLevel::Red => 1,
            TriageLevel::Orange => 2,
            TriageLevel::Yellow => 3,
            TriageLevel::Green => 4,
            TriageLevel::Blue => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TriageLevel::Red => "RED",
            TriageLevel::Orange => "ORANGE",
            TriageLevel::Yellow => "YELLOW",
            TriageLevel::Green => "GREEN",
            TriageLevel::Blue => "BLUE",
        }
    }

    /// Parse a stored or external level name (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "RED" => Some(TriageLevel::Red),
            "ORANGE" => Some(TriageLevel::Orange),
            "YELLOW" => Some(TriageLevel::Yellow),
            "GREEN" => Some(TriageLevel::Green),
            "BLUE" => Some(TriageLevel::Blue),
            _ => None,
        }
    }
}

impl fmt::Display for TriageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which level-assignment model the scorer runs after the GCS check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoringModel {
    /// Explicit clinical conditions over raw vitals, complaint text and the
    /// external prediction hint
    #[default]
    Clinical,
    /// Five-tier scale over the weighted total, followed by
    /// special-population escalation
    WeightedTier,
}

/// Vital signs snapshot as captured at intake.
///
/// Fields arrive from an HTML form, so each one may be a number, a numeric
/// string, an empty string or null. Anything that is not a finite number
/// becomes `0.0`, and `gcs_total` becomes `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VitalSigns {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub heart_rate_bpm: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub systolic_bp: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub diastolic_bp: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub temp_c: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub spo2_percent: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub resp_rate_min: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub pain_score: f64,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub gcs_total: Option<f64>,
}

fn coerce_number(value: Option<Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(coerce_number(raw).unwrap_or(0.0))
}

fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(coerce_number(raw))
}

/// A candidate disease returned by the prediction service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiseaseCandidate {
    pub disease: String,
    /// Percentage, 0-100
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub precautions: Vec<String>,
}

/// Response of the external disease-prediction service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictionResult {
    #[serde(default)]
    pub triage_level: Option<String>,
    #[serde(default)]
    pub predictions: Vec<DiseaseCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_method: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extracted_symptoms: Vec<String>,
}

impl PredictionResult {
    /// Whether the service hinted exactly this level
    pub fn flags(&self, level: TriageLevel) -> bool {
        self.triage_level
            .as_deref()
            .and_then(TriageLevel::parse)
            .is_some_and(|hint| hint == level)
    }

    /// Highest-ranked candidate, as ordered by the service
    pub fn top_candidate(&self) -> Option<&DiseaseCandidate> {
        self.predictions.first()
    }
}

/// Result of scoring one patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TriageOutcome {
    pub level: TriageLevel,
    /// Weighted vital-sign total rounded to two decimals
    pub score: f64,
    /// Reasons in evaluation order, never empty
    pub reasons: Vec<String>,
}
