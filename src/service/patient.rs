//! Patient intake, status workflow and queries

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::db::models::NewPatient;
use crate::db::repository::PatientRepository;
use crate::db::DbError;
use crate::model::{
    ColorLogEntry, IntakeReceipt, Patient, PatientIntake, PatientStatus, PredictionResult,
    StatusChange, StatusLogEntry, TriageOutcome,
};
use crate::service::cache::{CacheError, PredictionCache};
use crate::service::dashboard::{self, DashboardView};
use crate::service::prediction::PredictionSource;
use crate::service::triage::{TriageInput, TriageScorer};

const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PatientServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DbError(#[from] DbError),
}

/// Service for admitting patients and moving them through the department
pub struct PatientService {
    repository: PatientRepository,
    scorer: TriageScorer,
    predictor: Option<Arc<dyn PredictionSource>>,
    cache: Option<PredictionCache>,
}

impl PatientService {
    pub fn new(
        repository: PatientRepository,
        scorer: TriageScorer,
        predictor: Option<Arc<dyn PredictionSource>>,
        cache: Option<PredictionCache>,
    ) -> Self {
        Self {
            repository,
            scorer,
            predictor,
            cache,
        }
    }

    /// Validate, predict, score and persist a new patient
    pub async fn intake(&self, intake: PatientIntake) -> Result<IntakeReceipt, PatientServiceError> {
        validate_intake(&intake)?;

        let assessment = assess_intake(
            &self.scorer,
            self.predictor.as_deref(),
            self.cache.as_ref(),
            &intake,
            Utc::now().date_naive(),
        )
        .await;

        let record = NewPatient {
            national_id: non_empty(intake.national_id.as_deref()),
            first_name: intake.first_name.trim(),
            last_name: intake.last_name.trim(),
            sex: non_empty(intake.sex.as_deref()),
            date_of_birth: assessment.date_of_birth,
            indicator: non_empty(intake.indicator.as_deref()),
            symptoms: non_empty(intake.symptoms.as_deref()),
            triage_level: assessment.outcome.level,
            triage_score: assessment.outcome.score,
            triage_reason: assessment.triage_reason(),
            vitals: &intake.vital,
        };
        let patient_id = self.repository.insert_intake(&record).await?;

        tracing::info!(
            patient_id = patient_id,
            level = %assessment.outcome.level,
            score = assessment.outcome.score,
            predicted = assessment.prediction.is_some(),
            "Patient admitted"
        );

        Ok(assessment.into_receipt(patient_id))
    }

    pub async fn update_status(
        &self,
        patient_id: i64,
        status: PatientStatus,
    ) -> Result<StatusChange, PatientServiceError> {
        let change = self.repository.update_status(patient_id, status).await?;
        tracing::info!(
            patient_id = patient_id,
            from = %change.previous_status,
            to = %change.status,
            "Patient status updated"
        );
        Ok(change)
    }

    pub async fn get(&self, patient_id: i64) -> Result<Patient, PatientServiceError> {
        self.repository
            .get_by_id(patient_id)
            .await
            .map_err(PatientServiceError::from)
    }

    pub async fn list(&self) -> Result<Vec<Patient>, PatientServiceError> {
        self.repository
            .list()
            .await
            .map_err(PatientServiceError::from)
    }

    /// Ranked view over the current patient list
    pub async fn dashboard(&self) -> Result<DashboardView, PatientServiceError> {
        let patients = self.repository.list().await?;
        Ok(dashboard::build_view(&patients))
    }

    pub async fn status_logs(&self) -> Result<Vec<StatusLogEntry>, PatientServiceError> {
        self.repository
            .status_logs()
            .await
            .map_err(PatientServiceError::from)
    }

    pub async fn color_logs(&self) -> Result<Vec<ColorLogEntry>, PatientServiceError> {
        self.repository
            .color_logs()
            .await
            .map_err(PatientServiceError::from)
    }

    pub async fn clear(&self) -> Result<(), PatientServiceError> {
        self.repository
            .clear()
            .await
            .map_err(PatientServiceError::from)
    }
}

fn validate_intake(intake: &PatientIntake) -> Result<(), PatientServiceError> {
    if intake.first_name.trim().is_empty() || intake.last_name.trim().is_empty() {
        return Err(PatientServiceError::Validation(
            "First and last name are required".to_string(),
        ));
    }

    if let Some(gcs) = intake.vital.gcs_total {
        if !(3.0..=15.0).contains(&gcs) || gcs.fract() != 0.0 {
            return Err(PatientServiceError::Validation(format!(
                "GCS must be a whole number between 3 and 15, got {}",
                gcs
            )));
        }
    }

    Ok(())
}

/// Everything decided about a new patient before it is stored
#[derive(Debug)]
struct IntakeAssessment {
    date_of_birth: Option<NaiveDate>,
    outcome: TriageOutcome,
    prediction: Option<PredictionResult>,
}

impl IntakeAssessment {
    /// Reasons as stored in the patient row
    fn triage_reason(&self) -> String {
        self.outcome.reasons.join("; ")
    }

    fn into_receipt(self, patient_id: i64) -> IntakeReceipt {
        IntakeReceipt {
            patient_id,
            triage: self.outcome.level,
            score: self.outcome.score,
            reasoning: self.outcome.reasons,
            prediction: self.prediction,
        }
    }
}

/// Predict (only when there are symptoms) and score a validated intake
async fn assess_intake(
    scorer: &TriageScorer,
    predictor: Option<&dyn PredictionSource>,
    cache: Option<&PredictionCache>,
    intake: &PatientIntake,
    today: NaiveDate,
) -> IntakeAssessment {
    let symptoms = intake.symptoms.as_deref().map(str::trim).unwrap_or_default();
    let prediction = if symptoms.is_empty() {
        None
    } else {
        fetch_prediction(predictor, cache, symptoms).await
    };

    let date_of_birth = parse_date_of_birth(intake.date_of_birth.as_deref());
    let age_years = date_of_birth.map(|dob| age_in_years(dob, today));

    let outcome = scorer.score(&TriageInput {
        vitals: &intake.vital,
        symptoms,
        age_years,
        sex: non_empty(intake.sex.as_deref()),
        indicator: non_empty(intake.indicator.as_deref()),
        prediction: prediction.as_ref(),
    });

    IntakeAssessment {
        date_of_birth,
        outcome,
        prediction,
    }
}

/// Prediction for the symptom text, from cache if possible.
///
/// Never fails: an unreachable analyzer means scoring without a prediction.
async fn fetch_prediction(
    predictor: Option<&dyn PredictionSource>,
    cache: Option<&PredictionCache>,
    symptoms: &str,
) -> Option<PredictionResult> {
    let predictor = predictor?;

    if let Some(cache) = cache {
        match cache.get_prediction::<PredictionResult>(symptoms).await {
            Ok(cached) => {
                tracing::debug!("Prediction cache hit");
                return Some(cached);
            }
            Err(CacheError::Miss(_)) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read prediction cache"),
        }
    }

    match predictor.predict(symptoms).await {
        Ok(result) => {
            if let Some(cache) = cache {
                if let Err(e) = cache.set_prediction(symptoms, &result).await {
                    tracing::warn!(error = %e, "Failed to cache prediction");
                }
            }
            Some(result)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Disease prediction unavailable, scoring without it");
            None
        }
    }
}

/// `YYYY-MM-DD`, optionally followed by a time part; anything else is unknown
fn parse_date_of_birth(value: Option<&str>) -> Option<NaiveDate> {
    let value = non_empty(value)?;
    let date_part = value.get(..10).unwrap_or(value);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::warn!(value = %value, error = %e, "Ignoring unparseable date of birth");
            None
        }
    }
}

/// Fractional age in years; negative when the birth date is in the future
fn age_in_years(date_of_birth: NaiveDate, today: NaiveDate) -> f64 {
    (today - date_of_birth).num_days() as f64 / DAYS_PER_YEAR
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::model::{DiseaseCandidate, ScoringModel, TriageLevel, VitalSigns};
    use crate::service::prediction::PredictionError;
    use async_trait::async_trait;

    struct FixedSource(PredictionResult);

    #[async_trait]
    impl PredictionSource for FixedSource {
        async fn predict(&self, _symptoms: &str) -> Result<PredictionResult, PredictionError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl PredictionSource for FailingSource {
        async fn predict(&self, _symptoms: &str) -> Result<PredictionResult, PredictionError> {
            Err(PredictionError::Status(503))
        }
    }

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PredictionSource for CountingSource {
        async fn predict(&self, _symptoms: &str) -> Result<PredictionResult, PredictionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PredictionResult::default())
        }
    }

    fn migraine() -> PredictionResult {
        PredictionResult {
            triage_level: Some("YELLOW".to_string()),
            predictions: vec![DiseaseCandidate {
                disease: "Migraine".to_string(),
                confidence: 81.0,
                description: None,
                precautions: vec![],
            }],
            ..PredictionResult::default()
        }
    }

    fn intake(first: &str, last: &str) -> PatientIntake {
        PatientIntake {
            first_name: first.to_string(),
            last_name: last.to_string(),
            ..PatientIntake::default()
        }
    }

    fn with_symptoms(symptoms: &str) -> PatientIntake {
        PatientIntake {
            symptoms: Some(symptoms.to_string()),
            ..intake("Anan", "Chai")
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_names_are_required() {
        assert!(validate_intake(&intake("Anan", "Chai")).is_ok());
        assert!(matches!(
            validate_intake(&intake("  ", "Chai")),
            Err(PatientServiceError::Validation(_))
        ));
        assert!(matches!(
            validate_intake(&intake("Anan", "")),
            Err(PatientServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_gcs_range_is_checked() {
        let mut form = intake("Anan", "Chai");
        for gcs in [3.0, 8.0, 15.0] {
            form.vital = VitalSigns {
                gcs_total: Some(gcs),
                ..VitalSigns::default()
            };
            assert!(validate_intake(&form).is_ok(), "gcs {}", gcs);
        }
        for gcs in [2.0, 16.0, 0.0] {
            form.vital.gcs_total = Some(gcs);
            assert!(validate_intake(&form).is_err(), "gcs {}", gcs);
        }
        form.vital.gcs_total = None;
        assert!(validate_intake(&form).is_ok());
    }

    #[test]
    fn test_fractional_gcs_is_rejected() {
        let mut form = intake("Anan", "Chai");
        for gcs in [8.5, 12.5, 14.9] {
            form.vital.gcs_total = Some(gcs);
            assert!(
                matches!(validate_intake(&form), Err(PatientServiceError::Validation(_))),
                "gcs {}",
                gcs
            );
        }
    }

    #[test]
    fn test_parse_date_of_birth() {
        assert_eq!(
            parse_date_of_birth(Some("1985-07-21")),
            NaiveDate::from_ymd_opt(1985, 7, 21)
        );
        assert_eq!(
            parse_date_of_birth(Some("1985-07-21T00:00:00Z")),
            NaiveDate::from_ymd_opt(1985, 7, 21)
        );
        assert_eq!(parse_date_of_birth(Some("")), None);
        assert_eq!(parse_date_of_birth(Some("21/07/1985")), None);
        assert_eq!(parse_date_of_birth(None), None);
    }

    #[test]
    fn test_age_in_years() {
        let infant = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let age = age_in_years(infant, today());
        assert!(age > 0.0 && age < 0.25);

        let adult = NaiveDate::from_ymd_opt(1954, 3, 1).unwrap();
        assert!((age_in_years(adult, today()) - 70.0).abs() < 0.01);

        let future = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(age_in_years(future, today()) < 0.0);
    }

    #[tokio::test]
    async fn test_fetch_prediction_uses_source() {
        let source = FixedSource(migraine());
        let result = fetch_prediction(Some(&source as &dyn PredictionSource), None, "headache")
            .await
            .unwrap();
        assert_eq!(result.top_candidate().unwrap().disease, "Migraine");
    }

    #[tokio::test]
    async fn test_fetch_prediction_failure_is_absent() {
        let failing = &FailingSource as &dyn PredictionSource;
        assert!(fetch_prediction(Some(failing), None, "headache").await.is_none());
        assert!(fetch_prediction(None, None, "headache").await.is_none());
    }

    #[tokio::test]
    async fn test_blank_symptoms_skip_prediction() {
        let source = CountingSource::default();
        let scorer = TriageScorer::default();

        for form in [intake("Anan", "Chai"), with_symptoms(""), with_symptoms("   ")] {
            let assessment = assess_intake(
                &scorer,
                Some(&source as &dyn PredictionSource),
                None,
                &form,
                today(),
            )
            .await;
            assert!(assessment.prediction.is_none());
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);

        assess_intake(
            &scorer,
            Some(&source as &dyn PredictionSource),
            None,
            &with_symptoms(" cough "),
            today(),
        )
        .await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_prediction_still_yields_receipt() {
        let assessment = assess_intake(
            &TriageScorer::default(),
            Some(&FailingSource as &dyn PredictionSource),
            None,
            &with_symptoms("headache"),
            today(),
        )
        .await;

        let receipt = assessment.into_receipt(12);
        assert_eq!(receipt.patient_id, 12);
        assert_eq!(receipt.triage, TriageLevel::Blue);
        assert_eq!(receipt.reasoning, vec!["Normal condition".to_string()]);
        assert!(receipt.prediction.is_none());
    }

    #[tokio::test]
    async fn test_receipt_carries_prediction_and_joined_reasons() {
        let source = FixedSource(migraine());
        let assessment = assess_intake(
            &TriageScorer::default(),
            Some(&source as &dyn PredictionSource),
            None,
            &with_symptoms("throbbing headache"),
            today(),
        )
        .await;

        assert_eq!(
            assessment.triage_reason(),
            "External prediction flagged urgent condition; Possible disease: Migraine (81.0% confidence)"
        );

        let receipt = assessment.into_receipt(3);
        assert_eq!(receipt.triage, TriageLevel::Yellow);
        assert_eq!(receipt.reasoning.len(), 2);
        assert_eq!(receipt.prediction, Some(migraine()));
    }

    #[tokio::test]
    async fn test_date_of_birth_feeds_age_rules() {
        let form = PatientIntake {
            date_of_birth: Some("2024-02-01".to_string()),
            vital: VitalSigns {
                temp_c: 38.5,
                ..VitalSigns::default()
            },
            ..intake("Baby", "Chai")
        };

        let assessment = assess_intake(
            &TriageScorer::new(ScoringModel::WeightedTier),
            None,
            None,
            &form,
            today(),
        )
        .await;

        assert_eq!(assessment.date_of_birth, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(assessment.outcome.level, TriageLevel::Yellow);
        assert!(assessment
            .outcome
            .reasons
            .contains(&"Infant <3 months with fever".to_string()));
    }
}
