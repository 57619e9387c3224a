//! Definições de erro para a biblioteca clinic-core
//!
//! Este módulo define os tipos de erro usados pelos formulários da recepção
//! e pelo armazenamento de registros de consulta

use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Resultado padrão das operações do domínio
pub type Result<T> = std::result::Result<T, ClinicError>;

/// Mensagem de validação associada a um campo do formulário
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Caminho do campo (ex.: `prescriptions[0].duration`)
    pub field: String,
    /// Mensagem exibida ao lado do campo
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Erros do domínio da recepção
#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("Falha de validação: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("Nenhum agendamento encontrado para os dados informados")]
    NotFound,

    #[error("Paciente já realizou check-in")]
    AlreadyCheckedIn,

    #[error("Transição de status inválida: {0}")]
    InvalidTransition(String),

    #[error("Exame não cadastrado na tabela de preços: {0}")]
    UnknownTest(String),

    #[error("Registro não encontrado: {0}")]
    RecordNotFound(String),

    #[error("Violação de restrição: {0}")]
    Conflict(String),

    #[error("Erro de banco de dados: {0}")]
    Database(String),

    #[error("Erro de serialização: {0}")]
    Serialization(String),
}

impl ClinicError {
    /// Atalho para um erro de validação de um único campo
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ClinicError::Validation(vec![FieldError::new(field, message)])
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Achata os erros do `validator` (inclusive listas aninhadas) em mensagens por campo
pub fn flatten_validation(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect_validation(errors, "", &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect_validation(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "This field is required".to_string());
                    out.push(FieldError::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_validation(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validation(inner, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

impl From<ValidationErrors> for ClinicError {
    fn from(errors: ValidationErrors) -> Self {
        ClinicError::Validation(flatten_validation(&errors))
    }
}

/// Conversão de erros específicos do SQLx para nossos tipos de erro
impl From<sqlx::Error> for ClinicError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => ClinicError::RecordNotFound("Registro não encontrado".to_string()),
            sqlx::Error::Database(dbe) => {
                if let Some(code) = dbe.code() {
                    // SQLITE_CONSTRAINT_PRIMARYKEY / SQLITE_CONSTRAINT_UNIQUE
                    if &*code == "1555" || &*code == "2067" {
                        return ClinicError::Conflict(dbe.message().to_string());
                    }
                }
                ClinicError::Database(dbe.message().to_string())
            }
            sqlx::Error::ColumnNotFound(col) => {
                ClinicError::Database(format!("Coluna não encontrada: {}", col))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                ClinicError::Database(format!("Erro ao decodificar coluna {}: {}", index, source))
            }
            sqlx::Error::PoolClosed => ClinicError::Database("Pool de conexões fechado".to_string()),
            sqlx::Error::PoolTimedOut => {
                ClinicError::Database("Timeout no pool de conexões".to_string())
            }
            other => ClinicError::Database(format!("Erro inesperado: {}", other)),
        }
    }
}

impl From<serde_json::Error> for ClinicError {
    fn from(error: serde_json::Error) -> Self {
        ClinicError::Serialization(error.to_string())
    }
}
