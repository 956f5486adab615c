use actix_web::{App, HttpServer, web};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod db;
mod model;
mod service;

use app::{AppError, AppState};
use model::Config;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    let state = AppState::new(config).await?;

    let db_pool = web::Data::new(state.db_pool);
    let cache = web::Data::new(state.cache);
    let scorer = web::Data::new(state.scorer);
    let patient_service = web::Data::from(state.patient_service);

    tracing::info!("Starting Triage Desk server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(db_pool.clone())
            .app_data(cache.clone())
            .app_data(scorer.clone())
            .app_data(patient_service.clone())
            .configure(api::health::configure)
            .configure(api::triage::configure)
            .configure(api::patient::configure)
            .configure(api::logs::configure)
            .configure(api::dashboard::configure)
            .configure(api::openapi::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
