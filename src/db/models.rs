//! Database rows for patients, vitals and audit logs

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::model::{
    ColorLogEntry, Patient, PatientStatus, StatusLogEntry, TriageLevel, VitalSigns,
};

/// Patient joined with the vitals captured at intake
#[derive(Debug, Clone, FromRow)]
pub struct PatientRow {
    pub patient_id: i64,
    pub national_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub sex: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub indicator: Option<String>,
    pub symptoms: Option<String>,
    pub triage_level: String,
    pub triage_score: f64,
    pub triage_reason: String,
    pub status_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub heart_rate_bpm: Option<f64>,
    pub resp_rate_min: Option<f64>,
    pub systolic_bp: Option<f64>,
    pub diastolic_bp: Option<f64>,
    pub temp_c: Option<f64>,
    pub spo2_percent: Option<f64>,
    pub gcs_total: Option<f64>,
    pub pain_score: Option<f64>,
}

impl PatientRow {
    /// Convert database row to domain model
    pub fn into_domain(self) -> Result<Patient, String> {
        let triage_level = parse_level(&self.triage_level)?;
        let status = parse_status(&self.status_name)?;
        let full_name = format!("{} {}", self.first_name, self.last_name);

        Ok(Patient {
            patient_id: self.patient_id,
            national_id: self.national_id,
            first_name: self.first_name,
            last_name: self.last_name,
            full_name,
            sex: self.sex,
            date_of_birth: self.date_of_birth,
            indicator: self.indicator,
            symptoms: self.symptoms,
            triage_level,
            triage_score: self.triage_score,
            triage_reason: self.triage_reason,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            vitals: VitalSigns {
                heart_rate_bpm: self.heart_rate_bpm.unwrap_or_default(),
                systolic_bp: self.systolic_bp.unwrap_or_default(),
                diastolic_bp: self.diastolic_bp.unwrap_or_default(),
                temp_c: self.temp_c.unwrap_or_default(),
                spo2_percent: self.spo2_percent.unwrap_or_default(),
                resp_rate_min: self.resp_rate_min.unwrap_or_default(),
                pain_score: self.pain_score.unwrap_or_default(),
                gcs_total: self.gcs_total,
            },
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StatusLogRow {
    pub statuslog_id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub status_name: String,
    pub logged_at: DateTime<Utc>,
}

impl StatusLogRow {
    pub fn into_domain(self) -> Result<StatusLogEntry, String> {
        Ok(StatusLogEntry {
            statuslog_id: self.statuslog_id,
            patient_id: self.patient_id,
            patient_name: self.patient_name,
            status: parse_status(&self.status_name)?,
            logged_at: self.logged_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ColorLogRow {
    pub colorlog_id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub triage_level: String,
    pub logged_at: DateTime<Utc>,
}

impl ColorLogRow {
    pub fn into_domain(self) -> Result<ColorLogEntry, String> {
        Ok(ColorLogEntry {
            colorlog_id: self.colorlog_id,
            patient_id: self.patient_id,
            patient_name: self.patient_name,
            triage_level: parse_level(&self.triage_level)?,
            logged_at: self.logged_at,
        })
    }
}

/// Values written for a new patient at intake
#[derive(Debug, Clone)]
pub struct NewPatient<'a> {
    pub national_id: Option<&'a str>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub sex: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
    pub indicator: Option<&'a str>,
    pub symptoms: Option<&'a str>,
    pub triage_level: TriageLevel,
    pub triage_score: f64,
    pub triage_reason: String,
    pub vitals: &'a VitalSigns,
}

fn parse_level(value: &str) -> Result<TriageLevel, String> {
    TriageLevel::parse(value).ok_or_else(|| format!("Invalid triage level: {}", value))
}

fn parse_status(value: &str) -> Result<PatientStatus, String> {
    PatientStatus::parse(value).ok_or_else(|| format!("Invalid patient status: {}", value))
}
