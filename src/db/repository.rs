//! Repository for patient, vitals and audit-log database operations

use sqlx::PgPool;

use super::models::{ColorLogRow, NewPatient, PatientRow, StatusLogRow};
use super::DbError;
use crate::model::{
    ColorLogEntry, Patient, PatientStatus, StatusChange, StatusLogEntry, TriageLevel, TriageState,
};

const SELECT_PATIENT: &str = r#"
    SELECT
        p.patient_id, p.national_id, p.first_name, p.last_name, p.sex,
        p.date_of_birth, p.indicator, p.symptoms,
        p.triage_level, p.triage_score, p.triage_reason, p.status_name,
        p.created_at, p.updated_at,
        vs.heart_rate_bpm, vs.resp_rate_min, vs.systolic_bp, vs.diastolic_bp,
        vs.temp_c, vs.spo2_percent, vs.gcs_total, vs.pain_score
    FROM patients p
    LEFT JOIN vital_signs vs ON vs.patient_id = p.patient_id
"#;

/// Repository for patient operations
#[derive(Clone)]
pub struct PatientRepository {
    pool: PgPool,
}

impl PatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a patient, its vitals and the initial status and color log
    /// entries in one transaction. Returns the new patient id.
    pub async fn insert_intake(&self, patient: &NewPatient<'_>) -> Result<i64, DbError> {
        let mut tx = self.pool.begin().await?;
        let status = PatientStatus::Waiting.as_str();
        let level = patient.triage_level.as_str();

        let (patient_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO patients (
                national_id, first_name, last_name, sex, date_of_birth,
                indicator, symptoms, triage_level, triage_score, triage_reason, status_name
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING patient_id
            "#,
        )
        .bind(patient.national_id)
        .bind(patient.first_name)
        .bind(patient.last_name)
        .bind(patient.sex)
        .bind(patient.date_of_birth)
        .bind(patient.indicator)
        .bind(patient.symptoms)
        .bind(level)
        .bind(patient.triage_score)
        .bind(&patient.triage_reason)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        let vitals = patient.vitals;
        sqlx::query(
            r#"
            INSERT INTO vital_signs (
                patient_id, heart_rate_bpm, resp_rate_min, systolic_bp, diastolic_bp,
                temp_c, spo2_percent, gcs_total, pain_score
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(patient_id)
        .bind(vitals.heart_rate_bpm)
        .bind(vitals.resp_rate_min)
        .bind(vitals.systolic_bp)
        .bind(vitals.diastolic_bp)
        .bind(vitals.temp_c)
        .bind(vitals.spo2_percent)
        .bind(vitals.gcs_total)
        .bind(vitals.pain_score)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO status_logs (patient_id, status_name) VALUES ($1, $2)")
            .bind(patient_id)
            .bind(status)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO color_logs (patient_id, triage_level) VALUES ($1, $2)")
            .bind(patient_id)
            .bind(level)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(patient_id = patient_id, level = level, "Inserted patient intake");
        Ok(patient_id)
    }

    /// List all patients with their vitals, highest score first
    pub async fn list(&self) -> Result<Vec<Patient>, DbError> {
        let query = format!(
            "{} ORDER BY p.triage_score DESC, p.patient_id ASC",
            SELECT_PATIENT
        );
        let rows: Vec<PatientRow> = sqlx::query_as(&query).fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(|row| row.into_domain().map_err(DbError::Serialization))
            .collect()
    }

    /// Get a patient by ID
    pub async fn get_by_id(&self, patient_id: i64) -> Result<Patient, DbError> {
        let query = format!("{} WHERE p.patient_id = $1", SELECT_PATIENT);
        let row: PatientRow = sqlx::query_as(&query)
            .bind(patient_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(patient_id.to_string()))?;

        row.into_domain().map_err(DbError::Serialization)
    }

    /// Move a patient to a new status.
    ///
    /// The row is locked for the read-modify-write. A status log entry is
    /// written only if the status changed, a color log entry only if the
    /// triage level changed.
    pub async fn update_status(
        &self,
        patient_id: i64,
        status: PatientStatus,
    ) -> Result<StatusChange, DbError> {
        let mut tx = self.pool.begin().await?;

        let (level, score, current_status): (String, f64, String) = sqlx::query_as(
            "SELECT triage_level, triage_score, status_name FROM patients WHERE patient_id = $1 FOR UPDATE",
        )
        .bind(patient_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::NotFound(patient_id.to_string()))?;

        let current = TriageState {
            level: TriageLevel::parse(&level)
                .ok_or_else(|| DbError::Serialization(format!("Invalid triage level: {}", level)))?,
            score,
            status: PatientStatus::parse(&current_status).ok_or_else(|| {
                DbError::Serialization(format!("Invalid patient status: {}", current_status))
            })?,
        };
        let next = current.with_status(status);
        let (status_changed, level_changed) = current.changes(&next);

        sqlx::query(
            r#"
            UPDATE patients
            SET status_name = $1, triage_level = $2, triage_score = $3, updated_at = NOW()
            WHERE patient_id = $4
            "#,
        )
        .bind(next.status.as_str())
        .bind(next.level.as_str())
        .bind(next.score)
        .bind(patient_id)
        .execute(&mut *tx)
        .await?;

        if status_changed {
            sqlx::query("INSERT INTO status_logs (patient_id, status_name) VALUES ($1, $2)")
                .bind(patient_id)
                .bind(next.status.as_str())
                .execute(&mut *tx)
                .await?;
        }

        if level_changed {
            sqlx::query("INSERT INTO color_logs (patient_id, triage_level) VALUES ($1, $2)")
                .bind(patient_id)
                .bind(next.level.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            patient_id = patient_id,
            from = %current.status,
            to = %next.status,
            level = %next.level,
            "Updated patient status"
        );

        Ok(StatusChange {
            patient_id,
            previous_status: current.status,
            status: next.status,
            triage_level: next.level,
            triage_score: next.score,
        })
    }

    /// Status log, newest first
    pub async fn status_logs(&self) -> Result<Vec<StatusLogEntry>, DbError> {
        let rows: Vec<StatusLogRow> = sqlx::query_as(
            r#"
            SELECT sl.statuslog_id, sl.patient_id,
                   p.first_name || ' ' || p.last_name AS patient_name,
                   sl.status_name, sl.logged_at
            FROM status_logs sl
            JOIN patients p ON sl.patient_id = p.patient_id
            ORDER BY sl.logged_at DESC, sl.statuslog_id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.into_domain().map_err(DbError::Serialization))
            .collect()
    }

    /// Color (triage level) log, newest first
    pub async fn color_logs(&self) -> Result<Vec<ColorLogEntry>, DbError> {
        let rows: Vec<ColorLogRow> = sqlx::query_as(
            r#"
            SELECT cl.colorlog_id, cl.patient_id,
                   p.first_name || ' ' || p.last_name AS patient_name,
                   cl.triage_level, cl.logged_at
            FROM color_logs cl
            JOIN patients p ON cl.patient_id = p.patient_id
            ORDER BY cl.logged_at DESC, cl.colorlog_id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.into_domain().map_err(DbError::Serialization))
            .collect()
    }

    /// Delete every patient and log row and restart the id sequences
    pub async fn clear(&self) -> Result<(), DbError> {
        sqlx::query(
            "TRUNCATE TABLE status_logs, color_logs, vital_signs, patients RESTART IDENTITY",
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("Cleared all patient data");
        Ok(())
    }
}
