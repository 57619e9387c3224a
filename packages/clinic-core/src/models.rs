//! Modelos de dados compartilhados entre aplicações
//!
//! Este módulo define as estruturas de dados principais usadas pela recepção da clínica

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status possíveis de um agendamento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    /// Agendamento inicial, paciente ainda não chegou
    Scheduled,
    /// Paciente chegou e fez check-in
    #[serde(rename = "Checked-In")]
    CheckedIn,
    /// Consulta concluída
    Completed,
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "Scheduled"),
            AppointmentStatus::CheckedIn => write!(f, "Checked-In"),
            AppointmentStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// Tipo de consulta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisitType {
    /// Primeira consulta
    Initial,
    /// Retorno
    #[serde(rename = "Follow-Up")]
    FollowUp,
}

/// Representa uma consulta agendada
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Identificador do agendamento
    pub id: String,
    /// Identificador do paciente
    pub patient_id: String,
    /// Nome do paciente
    pub name: String,
    /// Contato (telefone ou e-mail)
    pub contact: String,
    /// Médico responsável
    pub doctor: String,
    /// Data e hora agendada
    pub appointment_time: NaiveDateTime,
    /// Status atual
    pub status: AppointmentStatus,
    /// Tipo de consulta
    #[serde(rename = "type")]
    pub visit_type: VisitType,
}

/// Entrada do histórico médico de um paciente
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalHistoryEntry {
    pub date: NaiveDate,
    pub diagnosis: String,
    pub notes: String,
    pub medications: Vec<String>,
}

/// Paciente cadastrado
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub patient_id: String,
    pub name: String,
    pub medical_history: Vec<MedicalHistoryEntry>,
}

/// Medicamento prescrito em uma consulta
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub medication_name: String,
    pub dosage_instructions: String,
    pub duration: String,
}

/// Pedido de exame laboratorial
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabTest {
    pub test_name: String,
    pub test_instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_results_url: Option<String>,
}

/// Registro de consulta persistido no servidor
///
/// É o formato consumido pelo painel da equipe e pela visualização da receita.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRecord {
    /// Identificador do registro
    pub record_id: String,
    /// Identificador do paciente
    pub patient_id: String,
    pub diagnosis: String,
    #[serde(default)]
    pub notes: String,
    pub prescriptions: Vec<Prescription>,
    pub lab_tests: Vec<LabTest>,
    /// Retorno agendado, se houver
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_date: Option<NaiveDateTime>,
    /// Total cobrado em rúpias
    #[serde(default)]
    pub total: u32,
    /// URL segura para visualizar a receita
    pub secure_url: String,
    /// Data e hora de criação do registro
    pub created_at: DateTime<Utc>,
}
