//! REST API endpoints for patients

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::error::{ApiError, ErrorResponse};
use crate::model::{IntakeReceipt, Patient, PatientIntake, PatientStatus, StatusChange};
use crate::service::PatientService;

/// Body of a status update
#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusUpdateRequest {
    /// One of `Waiting`, `Under Treatment`, `Transferred`, `Discharged`, `Deceased`
    #[serde(default)]
    pub status: Option<String>,
}

impl StatusUpdateRequest {
    fn parse_status(&self) -> Result<PatientStatus, ApiError> {
        self.status
            .as_deref()
            .and_then(PatientStatus::parse)
            .ok_or_else(|| ApiError::BadRequest("Invalid or missing status".to_string()))
    }
}

/// Admit a patient: score the intake and persist it
#[utoipa::path(
    post,
    path = "/v1/patients",
    request_body = PatientIntake,
    responses(
        (status = 201, description = "Patient admitted", body = IntakeReceipt),
        (status = 400, description = "Invalid intake", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "patients"
)]
#[post("/v1/patients")]
pub async fn admit_patient(
    service: web::Data<PatientService>,
    body: web::Json<PatientIntake>,
) -> Result<HttpResponse, ApiError> {
    let receipt = service.intake(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(receipt))
}

/// List all patients with their vitals, highest score first
#[utoipa::path(
    get,
    path = "/v1/patients",
    responses(
        (status = 200, description = "Patients retrieved successfully", body = Vec<Patient>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "patients"
)]
#[get("/v1/patients")]
pub async fn list_patients(service: web::Data<PatientService>) -> Result<HttpResponse, ApiError> {
    let patients = service.list().await?;
    Ok(HttpResponse::Ok().json(patients))
}

/// Get one patient by ID
#[utoipa::path(
    get,
    path = "/v1/patients/{id}",
    params(
        ("id" = i64, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "Patient retrieved successfully", body = Patient),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "patients"
)]
#[get("/v1/patients/{id}")]
pub async fn get_patient(
    service: web::Data<PatientService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let patient = service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(patient))
}

/// Move a patient to a new status
#[utoipa::path(
    put,
    path = "/v1/patients/{id}/status",
    params(
        ("id" = i64, Path, description = "Patient ID")
    ),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status updated", body = StatusChange),
        (status = 400, description = "Invalid status", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "patients"
)]
#[put("/v1/patients/{id}/status")]
pub async fn update_status(
    service: web::Data<PatientService>,
    path: web::Path<i64>,
    body: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, ApiError> {
    let status = body.parse_status()?;
    let change = service.update_status(path.into_inner(), status).await?;
    Ok(HttpResponse::Ok().json(change))
}

/// Delete every patient and log entry
#[utoipa::path(
    delete,
    path = "/v1/patients",
    responses(
        (status = 204, description = "All patient data deleted"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "patients"
)]
#[delete("/v1/patients")]
pub async fn clear_patients(service: web::Data<PatientService>) -> Result<HttpResponse, ApiError> {
    service.clear().await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configure patient routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(admit_patient)
        .service(list_patients)
        .service(clear_patients)
        .service(get_patient)
        .service(update_status);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(status: Option<&str>) -> StatusUpdateRequest {
        StatusUpdateRequest {
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(
            request(Some("Under Treatment")).parse_status().unwrap(),
            PatientStatus::UnderTreatment
        );
        assert_eq!(
            request(Some("Deceased")).parse_status().unwrap(),
            PatientStatus::Deceased
        );
        assert!(matches!(
            request(Some("Admitted")).parse_status(),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(request(None).parse_status(), Err(ApiError::BadRequest(_))));
    }
}
