//! Cadastro de novos pacientes
//!
//! A idade é derivada da data de nascimento e recalculada a cada alteração
//! da data. O identificador do paciente é gerado no envio do formulário.

use chrono::{Datelike, Local, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::error::{flatten_validation, ClinicError, FieldError, Result};
use crate::validation::{is_blank, not_blank, REQUIRED};

/// Domínio usado nos identificadores gerados
pub const PATIENT_ID_DOMAIN: &str = "clinicname.com";

/// Fonte da data atual
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Relógio do sistema (fuso local)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Anos completos entre `dob` e `today`; `None` para datas no futuro
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> Option<u32> {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    u32::try_from(age).ok()
}

/// Gera o identificador `<primeiro nome><0..999>@clinicname.com`
pub fn generate_patient_id<R: Rng + ?Sized>(first_name: &str, rng: &mut R) -> String {
    let suffix: u32 = rng.gen_range(0..1000);
    format!("{}{}@{}", first_name.trim().to_lowercase(), suffix, PATIENT_ID_DOMAIN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Formulário de cadastro do paciente
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientRegistration {
    // Dados pessoais
    #[validate(custom = "not_blank")]
    pub first_name: String,
    #[validate(custom = "not_blank")]
    pub last_name: String,
    #[validate(custom = "not_blank")]
    pub mother_name: String,
    #[validate(custom = "not_blank")]
    pub father_name: String,
    pub dob: Option<NaiveDate>,
    /// Derivada de `dob`, nunca informada pelo usuário
    #[serde(skip_deserializing)]
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub spouse_name: String,
    #[validate(custom = "not_blank")]
    pub blood_group: String,

    // Contato
    #[validate(custom = "not_blank")]
    pub contact_number: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub address: String,
    #[validate(custom = "not_blank")]
    pub pincode: String,
    #[validate(custom = "not_blank")]
    pub city: String,
    #[validate(custom = "not_blank")]
    pub state: String,

    pub medical_history: String,
}

/// Paciente cadastrado com identificador gerado
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredPatient {
    pub patient_id: String,
    pub age: Option<u32>,
    pub registration: PatientRegistration,
}

impl PatientRegistration {
    /// Atualiza a data de nascimento e recalcula a idade
    pub fn set_dob(&mut self, dob: Option<NaiveDate>, clock: &dyn Clock) {
        self.dob = dob;
        self.recompute_age(clock);
    }

    pub fn recompute_age(&mut self, clock: &dyn Clock) {
        let today = clock.today();
        self.age = self.dob.and_then(|dob| age_on(dob, today));
    }

    fn check(&self) -> Vec<FieldError> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => flatten_validation(&e),
        };
        if self.dob.is_none() {
            errors.push(FieldError::new("dob", REQUIRED));
        }
        match self.gender {
            None => errors.push(FieldError::new("gender", REQUIRED)),
            Some(Gender::Female) if is_blank(&self.spouse_name) => {
                errors.push(FieldError::new("spouse_name", REQUIRED))
            }
            Some(_) => {}
        }
        errors
    }

    /// Valida o formulário, recalcula a idade e gera o identificador
    pub fn submit<R: Rng + ?Sized>(mut self, clock: &dyn Clock, rng: &mut R) -> Result<RegisteredPatient> {
        let errors = self.check();
        if !errors.is_empty() {
            return Err(ClinicError::Validation(errors));
        }

        self.recompute_age(clock);
        let patient_id = generate_patient_id(&self.first_name, rng);
        info!(patient_id = %patient_id, "Paciente cadastrado");

        Ok(RegisteredPatient {
            patient_id,
            age: self.age,
            registration: self,
        })
    }
}
