//! Audit log endpoints

use actix_web::{HttpResponse, get, web};

use crate::api::error::{ApiError, ErrorResponse};
use crate::model::{ColorLogEntry, StatusLogEntry};
use crate::service::PatientService;

/// Status changes, newest first
#[utoipa::path(
    get,
    path = "/v1/logs/status",
    responses(
        (status = 200, description = "Status log", body = Vec<StatusLogEntry>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "logs"
)]
#[get("/v1/logs/status")]
pub async fn status_logs(service: web::Data<PatientService>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(service.status_logs().await?))
}

/// Triage level changes, newest first
#[utoipa::path(
    get,
    path = "/v1/logs/color",
    responses(
        (status = 200, description = "Color log", body = Vec<ColorLogEntry>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "logs"
)]
#[get("/v1/logs/color")]
pub async fn color_logs(service: web::Data<PatientService>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(service.color_logs().await?))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(status_logs).service(color_logs);
}
