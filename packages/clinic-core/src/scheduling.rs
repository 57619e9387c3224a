//! Agenda da clínica: horários disponíveis e formulário de agendamento

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::error::{flatten_validation, ClinicError, FieldError, Result};
use crate::mock_data::DOCTORS;
use crate::validation::not_blank;

/// Primeira hora de atendimento
pub const OPENING_HOUR: u32 = 10;
/// Hora de encerramento (exclusiva)
pub const CLOSING_HOUR: u32 = 19;
/// Horas sem atendimento (almoço e intervalo da tarde)
pub const EXCLUDED_HOURS: [u32; 2] = [13, 17];
/// Duração de cada horário em minutos
pub const SLOT_MINUTES: u32 = 15;

/// Aviso exibido para quem escolhe atendimento sem hora marcada
pub const WALK_IN_NOTICE: &str = "Direct walk-ins may experience a waiting time, as scheduled \
appointments will be prioritized. The wait to see the doctor may range from 30 to 45 minutes.";

/// Mensagem de confirmação do pedido de agendamento
pub const BOOKING_SUBMITTED: &str = "Thank you! Your appointment request has been submitted.";

/// Horário de início de uma consulta (formato `H:MM`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    pub hour: u32,
    pub minute: u32,
}

impl TimeSlot {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// Indica se o horário é um dos oferecidos pela clínica
    pub fn is_bookable(&self) -> bool {
        (OPENING_HOUR..CLOSING_HOUR).contains(&self.hour)
            && !EXCLUDED_HOURS.contains(&self.hour)
            && self.minute < 60
            && self.minute % SLOT_MINUTES == 0
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeSlot {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ClinicError::field("appointment_time", format!("Horário inválido: {}", s));
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour = hour.parse::<u32>().map_err(|_| invalid())?;
        let minute = minute.parse::<u32>().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(Self { hour, minute })
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = ClinicError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

/// Gera os horários de 15 minutos do dia, pulando as horas sem atendimento
pub fn generate_time_slots() -> Vec<TimeSlot> {
    (OPENING_HOUR..CLOSING_HOUR)
        .filter(|hour| !EXCLUDED_HOURS.contains(hour))
        .flat_map(|hour| (0..60).step_by(SLOT_MINUTES as usize).map(move |minute| TimeSlot::new(hour, minute)))
        .collect()
}

/// Modalidade do atendimento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentMode {
    /// Consulta com data e hora marcadas
    Online,
    /// Atendimento por ordem de chegada
    #[serde(rename = "walkin")]
    WalkIn,
}

/// Formulário de pedido de agendamento
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentRequest {
    pub preferred_doctor: Option<String>,
    #[validate(custom = "not_blank")]
    pub reason_for_visit: String,
    pub mode_of_appointment: Option<AppointmentMode>,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<TimeSlot>,
    /// Disponibilidade para um próximo horário (texto livre)
    pub alternative_dates: String,
    // Histórico médico informado pelo paciente
    pub current_conditions: String,
    pub past_surgeries: String,
    pub allergies: String,
    pub medications: String,
}

/// Resposta ao pedido de agendamento aceito
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub request: AppointmentRequest,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub walk_in_notice: Option<String>,
}

impl AppointmentRequest {
    /// Valida o pedido e monta a confirmação
    pub fn submit(self) -> Result<BookingConfirmation> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => flatten_validation(&e),
        };

        if self.appointment_date.is_none() {
            errors.push(FieldError::new("appointment_date", crate::validation::REQUIRED));
        }

        if let Some(doctor) = self.preferred_doctor.as_deref() {
            if !doctor.is_empty() && !DOCTORS.contains(&doctor) {
                errors.push(FieldError::new("preferred_doctor", format!("Médico desconhecido: {}", doctor)));
            }
        }

        if self.mode_of_appointment == Some(AppointmentMode::Online) {
            match self.appointment_time {
                None => errors.push(FieldError::new("appointment_time", crate::validation::REQUIRED)),
                Some(slot) if !slot.is_bookable() => errors.push(FieldError::new(
                    "appointment_time",
                    format!("Horário fora da agenda: {}", slot),
                )),
                Some(_) => {}
            }
        }

        if !errors.is_empty() {
            return Err(ClinicError::Validation(errors));
        }

        info!(
            mode = ?self.mode_of_appointment,
            date = ?self.appointment_date,
            "Pedido de agendamento recebido"
        );

        let walk_in_notice = (self.mode_of_appointment == Some(AppointmentMode::WalkIn))
            .then(|| WALK_IN_NOTICE.to_string());

        Ok(BookingConfirmation {
            request: self,
            message: BOOKING_SUBMITTED.to_string(),
            walk_in_notice,
        })
    }
}
