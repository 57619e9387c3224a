//! Acesso aos registros de consulta e cadastros persistidos

use chrono::{DateTime, NaiveDateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::consultation::ConsultationSnapshot;
use crate::error::{ClinicError, Result};
use crate::models::{ConsultationRecord, LabTest, Prescription};
use crate::registration::RegisteredPatient;

/// Tamanho do token opaco da URL segura
const TOKEN_LEN: usize = 32;

fn decode_json<T: serde::de::DeserializeOwned>(row: &SqliteRow, column: &str) -> sqlx::Result<T> {
    let raw: String = row.try_get(column)?;
    serde_json::from_str(&raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl FromRow<'_, SqliteRow> for ConsultationRecord {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let total: i64 = row.try_get("total")?;
        Ok(Self {
            record_id: row.try_get("id")?,
            patient_id: row.try_get("patient_id")?,
            diagnosis: row.try_get("diagnosis")?,
            notes: row.try_get("notes")?,
            prescriptions: decode_json::<Vec<Prescription>>(row, "prescriptions_json")?,
            lab_tests: decode_json::<Vec<LabTest>>(row, "lab_tests_json")?,
            follow_up_date: row.try_get::<Option<NaiveDateTime>, _>("follow_up_date")?,
            total: u32::try_from(total).unwrap_or_default(),
            secure_url: row.try_get("secure_url")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

/// Gera o token opaco usado na URL segura
pub fn generate_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// URL pública da receita para um token
pub fn secure_url(public_base_url: &str, token: &str) -> String {
    format!("{}/prescription/{}", public_base_url.trim_end_matches('/'), token)
}

/// Grava a consulta enviada e devolve o registro com a URL segura
pub async fn insert_consultation(
    pool: &SqlitePool,
    patient_id: &str,
    snapshot: &ConsultationSnapshot,
    public_base_url: &str,
) -> Result<ConsultationRecord> {
    let record_id = Uuid::new_v4().to_string();
    let token = generate_token(&mut rand::thread_rng());
    let url = secure_url(public_base_url, &token);
    let created_at = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO consultations (
            id, token, patient_id, created_at, diagnosis, notes,
            prescriptions_json, lab_tests_json, follow_up_date, selected_test, total, secure_url
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record_id)
    .bind(&token)
    .bind(patient_id)
    .bind(created_at)
    .bind(&snapshot.diagnosis)
    .bind(&snapshot.notes)
    .bind(serde_json::to_string(&snapshot.prescriptions)?)
    .bind(serde_json::to_string(&snapshot.lab_tests)?)
    .bind(snapshot.follow_up_date)
    .bind(snapshot.selected_test.as_deref())
    .bind(i64::from(snapshot.total))
    .bind(&url)
    .execute(pool)
    .await?;

    info!(record_id = %record_id, patient_id, "Registro de consulta gravado");

    Ok(ConsultationRecord {
        record_id,
        patient_id: patient_id.to_string(),
        diagnosis: snapshot.diagnosis.clone(),
        notes: snapshot.notes.clone(),
        prescriptions: snapshot.prescriptions.clone(),
        lab_tests: snapshot.lab_tests.clone(),
        follow_up_date: snapshot.follow_up_date,
        total: snapshot.total,
        secure_url: url,
        created_at,
    })
}

/// Lista as consultas, mais recentes primeiro
pub async fn list_consultations(pool: &SqlitePool) -> Result<Vec<ConsultationRecord>> {
    let records = sqlx::query_as::<_, ConsultationRecord>(
        "SELECT * FROM consultations ORDER BY created_at DESC, rowid DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(records)
}

/// Busca uma consulta pelo token da URL segura
pub async fn find_consultation_by_token(pool: &SqlitePool, token: &str) -> Result<ConsultationRecord> {
    sqlx::query_as::<_, ConsultationRecord>("SELECT * FROM consultations WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ClinicError::RecordNotFound(format!("consulta com token {}", token)))
}

/// Grava um paciente recém-cadastrado
pub async fn insert_patient(pool: &SqlitePool, patient: &RegisteredPatient) -> Result<()> {
    let form = &patient.registration;
    sqlx::query(
        r#"
        INSERT INTO patients (id, first_name, last_name, dob, age, contact_number, email, registration_json)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&patient.patient_id)
    .bind(&form.first_name)
    .bind(&form.last_name)
    .bind(form.dob)
    .bind(patient.age.map(i64::from))
    .bind(&form.contact_number)
    .bind(&form.email)
    .bind(serde_json::to_string(form)?)
    .execute(pool)
    .await?;

    info!(patient_id = %patient.patient_id, "Paciente gravado");
    Ok(())
}

/// Busca um paciente cadastrado
pub async fn find_patient(pool: &SqlitePool, patient_id: &str) -> Result<RegisteredPatient> {
    let row = sqlx::query("SELECT id, age, registration_json FROM patients WHERE id = ?")
        .bind(patient_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ClinicError::RecordNotFound(format!("paciente {}", patient_id)))?;

    let age: Option<i64> = row.try_get("age")?;
    let mut registration: crate::registration::PatientRegistration = decode_json(&row, "registration_json")?;
    registration.age = age.and_then(|a| u32::try_from(a).ok());

    Ok(RegisteredPatient {
        patient_id: row.try_get("id")?,
        age: registration.age,
        registration,
    })
}
