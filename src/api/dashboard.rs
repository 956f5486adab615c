use actix_web::{HttpResponse, get, web};

use crate::api::error::{ApiError, ErrorResponse};
use crate::service::PatientService;
use crate::service::dashboard::DashboardView;

/// Active patients in treatment order, with per-level counts
#[utoipa::path(
    get,
    path = "/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard view", body = DashboardView),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "dashboard"
)]
#[get("/v1/dashboard")]
pub async fn dashboard(service: web::Data<PatientService>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(service.dashboard().await?))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard);
}
