use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use super::triage::{PredictionResult, TriageLevel, VitalSigns};

/// Where a patient currently is in the department workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PatientStatus {
    Waiting,
    #[serde(rename = "Under Treatment")]
    UnderTreatment,
    Transferred,
    Discharged,
    Deceased,
}

impl PatientStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PatientStatus::Waiting => "Waiting",
            PatientStatus::UnderTreatment => "Under Treatment",
            PatientStatus::Transferred => "Transferred",
            PatientStatus::Discharged => "Discharged",
            PatientStatus::Deceased => "Deceased",
        }
    }

    /// Parse the exact wire/storage name of a status
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Waiting" => Some(PatientStatus::Waiting),
            "Under Treatment" => Some(PatientStatus::UnderTreatment),
            "Transferred" => Some(PatientStatus::Transferred),
            "Discharged" => Some(PatientStatus::Discharged),
            "Deceased" => Some(PatientStatus::Deceased),
            _ => None,
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The triage fields a status change acts on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriageState {
    pub level: TriageLevel,
    pub score: f64,
    pub status: PatientStatus,
}

impl TriageState {
    /// State after moving to `status`.
    ///
    /// Treatment zeroes the score so the patient drops down the queue;
    /// leaving the department also resets the level to BLUE.
    pub fn with_status(self, status: PatientStatus) -> Self {
        match status {
            PatientStatus::UnderTreatment => Self {
                score: 0.0,
                status,
                ..self
            },
            PatientStatus::Transferred | PatientStatus::Discharged => Self {
                level: TriageLevel::Blue,
                score: 0.0,
                status,
            },
            PatientStatus::Waiting | PatientStatus::Deceased => Self { status, ..self },
        }
    }

    /// Which audit rows moving to `next` writes: `(status_log, color_log)`
    pub fn changes(&self, next: &Self) -> (bool, bool) {
        (self.status != next.status, self.level != next.level)
    }
}

/// Intake form submission
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PatientIntake {
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub sex: Option<String>,
    /// ISO date (`YYYY-MM-DD`); empty means unknown
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub indicator: Option<String>,
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub vital: VitalSigns,
}

/// A patient together with the vitals captured at intake
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Patient {
    pub patient_id: i64,
    pub national_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub sex: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub indicator: Option<String>,
    pub symptoms: Option<String>,
    pub triage_level: TriageLevel,
    pub triage_score: f64,
    pub triage_reason: String,
    pub status: PatientStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub vitals: VitalSigns,
}

/// Outcome of a successful intake
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IntakeReceipt {
    pub patient_id: i64,
    pub triage: TriageLevel,
    pub score: f64,
    pub reasoning: Vec<String>,
    pub prediction: Option<PredictionResult>,
}

/// Outcome of a status update
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusChange {
    pub patient_id: i64,
    pub previous_status: PatientStatus,
    pub status: PatientStatus,
    pub triage_level: TriageLevel,
    pub triage_score: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusLogEntry {
    pub statuslog_id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub status: PatientStatus,
    pub logged_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ColorLogEntry {
    pub colorlog_id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub triage_level: TriageLevel,
    pub logged_at: DateTime<Utc>,
}
