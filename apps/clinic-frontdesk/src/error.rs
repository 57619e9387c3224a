//! Erros da API com mapeamento para status HTTP e corpo JSON estruturado

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clinic_core::{ClinicError, FieldError};
use serde::Serialize;

/// Corpo de erro devolvido aos clientes
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

/// Erros da API
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Falha de validação: {message}")]
    Validation { message: String, fields: Vec<FieldError> },
    #[error("Não encontrado: {0}")]
    NotFound(String),
    #[error("Conflito: {0}")]
    Conflict(String),
    #[error("Requisição inválida: {0}")]
    BadRequest(String),
    #[error("Erro interno: {0}")]
    Internal(String),
}

/// Mensagem padrão para formulários incompletos
pub const REQUIRED_FIELDS: &str = "Please fill in all required fields.";

impl ApiError {
    pub fn validation(message: impl Into<String>, fields: Vec<FieldError>) -> Self {
        ApiError::Validation {
            message: message.into(),
            fields,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self {
            ApiError::Validation { message, fields } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_FAILED", message, fields)
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail, Vec::new()),
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail, Vec::new()),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail, Vec::new()),
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "Erro interno na API");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                    Vec::new(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message, fields },
        };
        (status, Json(body)).into_response()
    }
}

impl From<ClinicError> for ApiError {
    fn from(err: ClinicError) -> Self {
        match err {
            ClinicError::Validation(fields) => ApiError::validation(REQUIRED_FIELDS, fields),
            ClinicError::NotFound => ApiError::NotFound("No appointment found for the given details.".to_string()),
            ClinicError::AlreadyCheckedIn => ApiError::Conflict("Patient is already checked in.".to_string()),
            ClinicError::InvalidTransition(detail) => ApiError::Conflict(detail),
            ClinicError::UnknownTest(name) => ApiError::BadRequest(format!("Unknown lab test: {}", name)),
            ClinicError::RecordNotFound(detail) => ApiError::NotFound(detail),
            ClinicError::Conflict(detail) => ApiError::Conflict(detail),
            ClinicError::Database(detail) | ClinicError::Serialization(detail) => ApiError::Internal(detail),
        }
    }
}
