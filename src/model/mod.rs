pub mod config;
pub mod patient;
pub mod triage;

pub use config::{Config, PredictionConfig};
pub use patient::*;
pub use triage::*;
