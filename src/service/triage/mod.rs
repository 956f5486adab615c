//! Triage scoring
//!
//! Scoring is a pure function of the intake snapshot. Vitals are banded and
//! weighted into a severity score, a Glasgow Coma Scale reading can override
//! everything else, and the configured [`ScoringModel`] assigns the level.

mod bands;
mod clinical;
mod escalation;

use crate::model::{PredictionResult, ScoringModel, TriageLevel, TriageOutcome, VitalSigns};

use bands::SubScores;

/// Everything the scorer looks at for one patient
#[derive(Debug, Clone, Copy)]
pub struct TriageInput<'a> {
    pub vitals: &'a VitalSigns,
    pub symptoms: &'a str,
    /// Age in (fractional) years, unknown when the date of birth is missing
    pub age_years: Option<f64>,
    pub sex: Option<&'a str>,
    /// Free-text intake flag such as "pregnant" or "immunocompromised"
    pub indicator: Option<&'a str>,
    pub prediction: Option<&'a PredictionResult>,
}

impl<'a> TriageInput<'a> {
    /// Input with vitals only
    pub fn vitals(vitals: &'a VitalSigns) -> Self {
        Self {
            vitals,
            symptoms: "",
            age_years: None,
            sex: None,
            indicator: None,
            prediction: None,
        }
    }
}

/// Level and reasons accumulated while a model runs
#[derive(Debug)]
struct Assessment {
    level: TriageLevel,
    reasons: Vec<String>,
}

impl Assessment {
    fn new(level: TriageLevel, reason: impl Into<String>) -> Self {
        Self {
            level,
            reasons: vec![reason.into()],
        }
    }

    /// Raise the level to `candidate` if that is more severe; never lowers it
    fn escalate(&mut self, candidate: TriageLevel, reason: impl Into<String>) {
        self.level = self.level.max(candidate);
        self.reasons.push(reason.into());
    }

    fn note(&mut self, reason: impl Into<String>) {
        self.reasons.push(reason.into());
    }
}

/// Stateless scorer bound to one level-assignment model
#[derive(Debug, Clone, Copy, Default)]
pub struct TriageScorer {
    model: ScoringModel,
}

impl TriageScorer {
    pub fn new(model: ScoringModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> ScoringModel {
        self.model
    }

    pub fn score(&self, input: &TriageInput<'_>) -> TriageOutcome {
        score(self.model, input)
    }
}

/// Score one patient
pub fn score(model: ScoringModel, input: &TriageInput<'_>) -> TriageOutcome {
    let sub_scores = SubScores::from_vitals(input.vitals);
    let weighted_total = sub_scores.weighted_total();
    let score = round2(weighted_total);

    if let Some(gcs) = input.vitals.gcs_total {
        if gcs <= 8.0 {
            tracing::debug!(gcs = gcs, "GCS override to RED");
            return TriageOutcome {
                level: TriageLevel::Red,
                score,
                reasons: vec!["Severely altered consciousness (GCS ≤ 8)".to_string()],
            };
        }
        if (9.0..=12.0).contains(&gcs) {
            tracing::debug!(gcs = gcs, "GCS override to YELLOW");
            return TriageOutcome {
                level: TriageLevel::Yellow,
                score,
                reasons: vec!["Moderately altered consciousness (GCS 9–12)".to_string()],
            };
        }
    }

    let mut assessment = match model {
        ScoringModel::Clinical => clinical::assess(input),
        ScoringModel::WeightedTier => {
            let mut assessment = weighted_tier(weighted_total);
            escalation::apply(&mut assessment, input);
            assessment
        }
    };

    if let Some(candidate) = input.prediction.and_then(PredictionResult::top_candidate) {
        assessment.note(format!(
            "Possible disease: {} ({:.1}% confidence)",
            candidate.disease, candidate.confidence
        ));
    }

    tracing::debug!(
        model = ?model,
        level = %assessment.level,
        score = score,
        sub_scores = ?sub_scores,
        "Computed triage"
    );

    TriageOutcome {
        level: assessment.level,
        score,
        reasons: assessment.reasons,
    }
}

/// Base tier taken purely from the weighted total
fn weighted_tier(total: f64) -> Assessment {
    if total > 20.0 {
        Assessment::new(TriageLevel::Red, "Critical weighted score > 20")
    } else if total >= 16.0 {
        Assessment::new(TriageLevel::Orange, "Severe physiological derangement")
    } else if total >= 11.0 {
        Assessment::new(TriageLevel::Yellow, "Moderate vital deviation")
    } else if total >= 6.0 {
        Assessment::new(TriageLevel::Green, "Mild abnormalities")
    } else {
        Assessment::new(TriageLevel::Blue, "Stable vital signs")
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
