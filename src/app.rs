//! Application state and service initialization
//!
//! Builds the service graph once at startup so `main` only has to hand the
//! pieces to actix-web.

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::repository::PatientRepository;
use crate::model::Config;
use crate::service::{
    PatientService, PredictionCache, PredictionClient, PredictionSource, TriageScorer,
};

/// Application state containing all services and shared resources
pub struct AppState {
    /// Database connection pool
    pub db_pool: PgPool,
    /// Redis prediction cache (optional)
    pub cache: Option<PredictionCache>,
    /// Scorer bound to the configured model
    pub scorer: TriageScorer,
    /// Intake, status workflow and queries
    pub patient_service: Arc<PatientService>,
}

impl AppState {
    /// Initialize all services and build application state
    ///
    /// This performs:
    /// 1. Database connection and schema initialization
    /// 2. Redis cache initialization (optional)
    /// 3. Prediction client construction (unless disabled)
    /// 4. Service construction
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let db_pool = crate::db::create_pool()
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        crate::db::init_schema(&db_pool)
            .await
            .map_err(|e| AppError::DatabaseInit(e.to_string()))?;

        let cache = match PredictionCache::new(config.cache.ttl_seconds).await {
            Ok(cache) => {
                tracing::info!("Redis cache enabled");
                Some(cache)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Redis cache unavailable, running without cache");
                None
            }
        };

        let predictor = Self::build_predictor(&config)?;
        let scorer = TriageScorer::new(config.triage.model);

        tracing::info!(model = ?scorer.model(), "Triage scorer configured");

        let patient_service = Arc::new(PatientService::new(
            PatientRepository::new(db_pool.clone()),
            scorer,
            predictor,
            cache.clone(),
        ));

        Ok(Self {
            db_pool,
            cache,
            scorer,
            patient_service,
        })
    }

    fn build_predictor(config: &Config) -> Result<Option<Arc<dyn PredictionSource>>, AppError> {
        if !config.prediction.enabled {
            tracing::info!("Disease prediction disabled");
            return Ok(None);
        }

        let client = PredictionClient::new(&config.prediction)
            .map_err(|e| AppError::InvalidConfig(format!("prediction client: {}", e)))?;

        tracing::info!(base_url = %client.base_url(), "Disease prediction enabled");
        Ok(Some(Arc::new(client)))
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// Database initialization failed
    #[error("Database initialization failed: {0}")]
    DatabaseInit(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Server failed to bind or run
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}
