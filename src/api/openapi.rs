//! OpenAPI specification endpoints

use actix_web::{HttpResponse, get};
use utoipa::OpenApi;

use crate::api::error::{ApiError, ErrorResponse};
use crate::api::{dashboard, health, logs, patient, triage};
use crate::model::{
    ColorLogEntry, DiseaseCandidate, IntakeReceipt, Patient, PatientIntake, PatientStatus,
    PredictionResult, ScoringModel, StatusChange, StatusLogEntry, TriageLevel, TriageOutcome,
    VitalSigns,
};
use crate::service::dashboard::{DashboardCounts, DashboardRow, DashboardView};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Triage Desk API",
        description = "Emergency department intake, triage scoring and patient tracking"
    ),
    paths(
        health::liveness,
        health::readiness,
        triage::score,
        patient::admit_patient,
        patient::list_patients,
        patient::get_patient,
        patient::update_status,
        patient::clear_patients,
        logs::status_logs,
        logs::color_logs,
        dashboard::dashboard,
    ),
    components(schemas(
        health::HealthStatus,
        health::ReadinessStatus,
        health::DependencyHealth,
        triage::ScoreRequest,
        patient::StatusUpdateRequest,
        ErrorResponse,
        TriageLevel,
        ScoringModel,
        VitalSigns,
        DiseaseCandidate,
        PredictionResult,
        TriageOutcome,
        PatientStatus,
        PatientIntake,
        Patient,
        IntakeReceipt,
        StatusChange,
        StatusLogEntry,
        ColorLogEntry,
        DashboardRow,
        DashboardCounts,
        DashboardView,
    )),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "triage", description = "Stateless triage scoring"),
        (name = "patients", description = "Patient intake and status workflow"),
        (name = "logs", description = "Status and triage level audit logs"),
        (name = "dashboard", description = "Ranked view of active patients")
    )
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
#[get("/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Serve OpenAPI YAML specification
#[get("/openapi.yaml")]
pub async fn openapi_yaml() -> Result<HttpResponse, ApiError> {
    let yaml = ApiDoc::openapi()
        .to_yaml()
        .map_err(|e| ApiError::Internal(format!("Failed to render OpenAPI YAML: {}", e)))?;

    Ok(HttpResponse::Ok().content_type("text/yaml").body(yaml))
}

/// Configure OpenAPI routes
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(openapi_json).service(openapi_yaml);
}
