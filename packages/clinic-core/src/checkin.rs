//! Check-in de pacientes
//!
//! Localiza o agendamento pelo trio nome, contato e médico (comparação exata,
//! sem diferenciar maiúsculas) e muda o status para `Checked-In`.
//! Quando há mais de um agendamento com o mesmo trio, vale o primeiro da lista.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::error::{ClinicError, Result};
use crate::models::{Appointment, AppointmentStatus};
use crate::validation::not_blank;

/// Mensagem exibida quando falta algum campo do check-in
pub const MISSING_FIELDS_MESSAGE: &str =
    "Please fill in all required fields: Patient Name, Contact Number, and Preferred Doctor.";

/// Dados informados no balcão para localizar o agendamento
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckInQuery {
    #[validate(custom = "not_blank")]
    pub name: String,
    #[validate(custom = "not_blank")]
    pub contact: String,
    #[validate(custom = "not_blank")]
    pub doctor: String,
}

impl CheckInQuery {
    pub fn new(name: impl Into<String>, contact: impl Into<String>, doctor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
            doctor: doctor.into(),
        }
    }

    fn matches(&self, appt: &Appointment) -> bool {
        appt.name.to_lowercase() == self.name.to_lowercase()
            && appt.contact.to_lowercase() == self.contact.to_lowercase()
            && appt.doctor.to_lowercase() == self.doctor.to_lowercase()
    }
}

fn position(appointments: &[Appointment], query: &CheckInQuery) -> Result<usize> {
    query.validate()?;
    appointments
        .iter()
        .position(|appt| query.matches(appt))
        .ok_or(ClinicError::NotFound)
}

/// Procura o agendamento correspondente ao trio informado
pub fn find_appointment<'a>(appointments: &'a [Appointment], query: &CheckInQuery) -> Result<&'a Appointment> {
    let index = position(appointments, query)?;
    Ok(&appointments[index])
}

/// Marca a chegada do paciente e devolve o registro atualizado
///
/// Um agendamento que já fez check-in não é alterado.
pub fn check_in(appointment: &mut Appointment) -> Result<Appointment> {
    match appointment.status {
        AppointmentStatus::Scheduled => {
            appointment.status = AppointmentStatus::CheckedIn;
            Ok(appointment.clone())
        }
        AppointmentStatus::CheckedIn => Err(ClinicError::AlreadyCheckedIn),
        AppointmentStatus::Completed => Err(ClinicError::InvalidTransition(format!(
            "agendamento {} já foi concluído",
            appointment.id
        ))),
    }
}

/// Balcão de check-in: dono da lista de agendamentos do dia
#[derive(Debug, Clone, Default)]
pub struct CheckInDesk {
    appointments: Vec<Appointment>,
}

impl CheckInDesk {
    pub fn new(appointments: Vec<Appointment>) -> Self {
        Self { appointments }
    }

    /// Balcão semeado com os agendamentos fixos
    pub fn with_mock_data() -> Self {
        Self::new(crate::mock_data::appointments())
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn search(&self, query: &CheckInQuery) -> Result<&Appointment> {
        find_appointment(&self.appointments, query).map_err(|e| {
            if matches!(e, ClinicError::NotFound) {
                warn!(name = %query.name, doctor = %query.doctor, "Agendamento não encontrado");
            }
            e
        })
    }

    pub fn check_in(&mut self, query: &CheckInQuery) -> Result<Appointment> {
        let index = position(&self.appointments, query)?;
        let updated = check_in(&mut self.appointments[index])?;
        info!(appointment_id = %updated.id, "Check-in realizado");
        Ok(updated)
    }
}
