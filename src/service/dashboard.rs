//! Ranked dashboard view
//!
//! A pure projection of the current patient list: no state is kept between
//! refreshes, every call recomputes order and counts from scratch.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::{Patient, PatientStatus, TriageLevel};

/// One displayed patient
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardRow {
    /// 1-based position among active (non-deceased) patients
    pub priority: usize,
    pub patient_id: i64,
    pub full_name: String,
    pub sex: Option<String>,
    pub triage_level: TriageLevel,
    pub triage_score: f64,
    pub symptoms: Option<String>,
    pub status: PatientStatus,
    pub updated_at: DateTime<Utc>,
}

/// Summary boxes shown above the table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardCounts {
    /// Every patient, deceased included
    pub total: usize,
    pub critical: usize,
    /// ORANGE and YELLOW together
    pub urgent: usize,
    pub mild: usize,
    pub minor: usize,
    pub deceased: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardView {
    pub rows: Vec<DashboardRow>,
    pub counts: DashboardCounts,
}

/// Order patients by level (most urgent first) then score (highest first),
/// count deceased patients without displaying them, and tally the rest by level.
pub fn build_view(patients: &[Patient]) -> DashboardView {
    let mut ordered: Vec<&Patient> = patients.iter().collect();
    ordered.sort_by(|a, b| {
        a.triage_level
            .rank()
            .cmp(&b.triage_level.rank())
            .then_with(|| b.triage_score.total_cmp(&a.triage_score))
    });

    let mut counts = DashboardCounts {
        total: patients.len(),
        ..DashboardCounts::default()
    };
    let mut rows = Vec::with_capacity(patients.len());

    for patient in ordered {
        if patient.status == PatientStatus::Deceased {
            counts.deceased += 1;
            continue;
        }

        match patient.triage_level {
            TriageLevel::Red => counts.critical += 1,
            TriageLevel::Orange | TriageLevel::Yellow => counts.urgent += 1,
            TriageLevel::Green => counts.mild += 1,
            TriageLevel::Blue => counts.minor += 1,
        }

        rows.push(DashboardRow {
            priority: rows.len() + 1,
            patient_id: patient.patient_id,
            full_name: patient.full_name.clone(),
            sex: patient.sex.clone(),
            triage_level: patient.triage_level,
            triage_score: patient.triage_score,
            symptoms: patient.symptoms.clone(),
            status: patient.status,
            updated_at: patient.updated_at,
        });
    }

    DashboardView { rows, counts }
}
