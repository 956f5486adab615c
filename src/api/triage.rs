//! Stateless scoring endpoint

use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::error::{ApiError, ErrorResponse};
use crate::model::{PredictionResult, ScoringModel, TriageOutcome, VitalSigns};
use crate::service::TriageScorer;
use crate::service::triage::{self, TriageInput};

/// Everything the scorer needs for one patient
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ScoreRequest {
    #[serde(default)]
    pub vital: VitalSigns,
    #[serde(default)]
    pub symptoms: Option<String>,
    /// Age in years, fractional for infants
    #[serde(default)]
    pub age_years: Option<f64>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub indicator: Option<String>,
    /// Disease prediction to take into account, as returned by the analyzer
    #[serde(default)]
    pub prediction: Option<PredictionResult>,
    /// Overrides the configured model for this request
    #[serde(default)]
    pub model: Option<ScoringModel>,
}

/// Score a patient without storing anything
#[utoipa::path(
    post,
    path = "/v1/triage/score",
    request_body = ScoreRequest,
    responses(
        (status = 200, description = "Triage outcome", body = TriageOutcome),
        (status = 400, description = "Malformed request", body = ErrorResponse)
    ),
    tag = "triage"
)]
#[post("/v1/triage/score")]
pub async fn score(
    scorer: web::Data<TriageScorer>,
    body: web::Json<ScoreRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    let model = request.model.unwrap_or(scorer.model());

    let outcome = triage::score(
        model,
        &TriageInput {
            vitals: &request.vital,
            symptoms: request.symptoms.as_deref().unwrap_or_default(),
            age_years: request.age_years,
            sex: request.sex.as_deref(),
            indicator: request.indicator.as_deref(),
            prediction: request.prediction.as_ref(),
        },
    );

    Ok(HttpResponse::Ok().json(outcome))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(score);
}
