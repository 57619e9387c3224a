//! Endpoints JSON da recepção

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use clinic_core::billing::{self, BillingBreakdown};
use clinic_core::checkin::{CheckInQuery, MISSING_FIELDS_MESSAGE};
use clinic_core::consultation::ConsultationDraft;
use clinic_core::models::{Appointment, ConsultationRecord, Patient};
use clinic_core::registration::{age_on, PatientRegistration, RegisteredPatient};
use clinic_core::scheduling::{generate_time_slots, AppointmentRequest, BookingConfirmation, TimeSlot};
use clinic_core::{mock_data, repository, ClinicError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Tentativas de gerar um identificador de paciente livre
const PATIENT_ID_ATTEMPTS: usize = 5;

pub async fn health() -> &'static str {
    "ok"
}

/// `GET /api/appointments`
pub async fn list_appointments(State(state): State<AppState>) -> Json<Vec<Appointment>> {
    let desk = state.desk.read().await;
    Json(desk.appointments().to_vec())
}

// formulário de check-in tem mensagem própria para campos faltando
fn check_in_error(err: ClinicError) -> ApiError {
    match err {
        ClinicError::Validation(fields) => ApiError::validation(MISSING_FIELDS_MESSAGE, fields),
        other => other.into(),
    }
}

/// `POST /api/check-in/search`
pub async fn search_appointment(
    State(state): State<AppState>,
    Json(query): Json<CheckInQuery>,
) -> ApiResult<Appointment> {
    let desk = state.desk.read().await;
    let found = desk.search(&query).map_err(check_in_error)?;
    Ok(Json(found.clone()))
}

/// `POST /api/check-in`
pub async fn check_in(State(state): State<AppState>, Json(query): Json<CheckInQuery>) -> ApiResult<Appointment> {
    let mut desk = state.desk.write().await;
    let updated = desk.check_in(&query).map_err(check_in_error)?;
    Ok(Json(updated))
}

/// `GET /api/slots`
pub async fn slots() -> Json<Vec<TimeSlot>> {
    Json(generate_time_slots())
}

/// `POST /api/appointments`
pub async fn book_appointment(Json(request): Json<AppointmentRequest>) -> ApiResult<BookingConfirmation> {
    Ok(Json(request.submit()?))
}

/// `POST /api/patients`
pub async fn register_patient(
    State(state): State<AppState>,
    Json(form): Json<PatientRegistration>,
) -> Result<(StatusCode, Json<RegisteredPatient>), ApiError> {
    for attempt in 1..=PATIENT_ID_ATTEMPTS {
        let registered = {
            let mut rng = rand::thread_rng();
            form.clone().submit(&*state.clock, &mut rng)?
        };
        match repository::insert_patient(&state.pool, &registered).await {
            Ok(()) => return Ok((StatusCode::CREATED, Json(registered))),
            Err(ClinicError::Conflict(_)) => {
                warn!(attempt, patient_id = %registered.patient_id, "Identificador já usado, gerando outro");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(ApiError::Conflict("Could not allocate a patient identifier".to_string()))
}

/// `GET /api/patients/:id`
pub async fn get_patient(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<RegisteredPatient> {
    Ok(Json(repository::find_patient(&state.pool, &id).await?))
}

/// `GET /api/patients/:id/history`: histórico dos pacientes fixos
pub async fn patient_history(Path(id): Path<String>) -> ApiResult<Patient> {
    mock_data::find_patient(&id)
        .map(Json)
        .ok_or_else(|| ClinicError::RecordNotFound(format!("paciente {}", id)).into())
}

#[derive(Debug, Deserialize)]
pub struct AgeQuery {
    pub dob: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AgeResponse {
    pub age: Option<u32>,
}

/// `GET /api/patients/age?dob=YYYY-MM-DD`
pub async fn age(State(state): State<AppState>, Query(query): Query<AgeQuery>) -> Json<AgeResponse> {
    Json(AgeResponse {
        age: age_on(query.dob, state.clock.today()),
    })
}

#[derive(Debug, Deserialize)]
pub struct BillingQuery {
    pub test: Option<String>,
}

/// `GET /api/billing?test=...`
pub async fn billing(Query(query): Query<BillingQuery>) -> ApiResult<BillingBreakdown> {
    let selected = query.test.as_deref().filter(|t| !t.is_empty());
    Ok(Json(billing::breakdown(selected)?))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PricedTest {
    pub name: String,
    pub price: u32,
}

/// `GET /api/billing/tests`
pub async fn price_table() -> Json<Vec<PricedTest>> {
    Json(
        billing::PRICE_TABLE
            .iter()
            .map(|(name, price)| PricedTest {
                name: name.to_string(),
                price: *price,
            })
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationSubmission {
    pub patient_id: String,
    pub draft: ConsultationDraft,
}

/// `POST /api/consultations`
pub async fn submit_consultation(
    State(state): State<AppState>,
    Json(submission): Json<ConsultationSubmission>,
) -> Result<(StatusCode, Json<ConsultationRecord>), ApiError> {
    if submission.patient_id.trim().is_empty() {
        return Err(ClinicError::field("patient_id", clinic_core::validation::REQUIRED).into());
    }
    let mut draft = submission.draft;
    let snapshot = draft.submit()?;
    let record =
        repository::insert_consultation(&state.pool, submission.patient_id.trim(), &snapshot, &state.public_url).await?;
    info!(record_id = %record.record_id, "Consulta disponível em URL segura");
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/consultations`
pub async fn list_consultations(State(state): State<AppState>) -> ApiResult<Vec<ConsultationRecord>> {
    Ok(Json(repository::list_consultations(&state.pool).await?))
}

/// `GET /api/prescription/:token`
pub async fn prescription(State(state): State<AppState>, Path(token): Path<String>) -> ApiResult<ConsultationRecord> {
    Ok(Json(repository::find_consultation_by_token(&state.pool, &token).await?))
}
