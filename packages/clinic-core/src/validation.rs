//! Validadores customizados usados pelos formulários

use std::borrow::Cow;

use validator::ValidationError;

/// Mensagem padrão de campo obrigatório
pub const REQUIRED: &str = "This field is required";

/// Rejeita campos vazios ou só com espaços
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::Borrowed(REQUIRED));
        return Err(err);
    }
    Ok(())
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
