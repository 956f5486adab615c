pub mod cache;
pub mod dashboard;
pub mod patient;
pub mod prediction;
pub mod triage;

pub use cache::PredictionCache;
pub use patient::PatientService;
pub use prediction::{PredictionClient, PredictionSource};
pub use triage::TriageScorer;
