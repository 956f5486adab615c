pub mod dashboard;
pub mod error;
pub mod health;
pub mod logs;
pub mod openapi;
pub mod patient;
pub mod triage;

