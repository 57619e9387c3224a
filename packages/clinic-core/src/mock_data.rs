//! Dados fixos usados pela recepção enquanto não há integração com o prontuário

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{Appointment, AppointmentStatus, MedicalHistoryEntry, Patient, VisitType};

/// Médicos disponíveis para agendamento
pub const DOCTORS: &[&str] = &["Dr. Smith", "Dr. Brown", "Dr. Taylor"];

fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Agendamentos do dia
pub fn appointments() -> Vec<Appointment> {
    vec![
        Appointment {
            id: "1".to_string(),
            patient_id: "P001".to_string(),
            name: "John Doe".to_string(),
            contact: "john.doe@example.com".to_string(),
            doctor: "Dr. Smith".to_string(),
            appointment_time: at(2024, 4, 28, 10),
            status: AppointmentStatus::Scheduled,
            visit_type: VisitType::Initial,
        },
        Appointment {
            id: "2".to_string(),
            patient_id: "P002".to_string(),
            name: "Jane Smith".to_string(),
            contact: "jane.smith@example.com".to_string(),
            doctor: "Dr. Brown".to_string(),
            appointment_time: at(2024, 4, 28, 11),
            status: AppointmentStatus::Scheduled,
            visit_type: VisitType::Initial,
        },
        Appointment {
            id: "3".to_string(),
            patient_id: "P001".to_string(),
            name: "John Doe".to_string(),
            contact: "john.doe@example.com".to_string(),
            doctor: "Dr. Taylor".to_string(),
            appointment_time: at(2024, 4, 28, 15),
            status: AppointmentStatus::CheckedIn,
            visit_type: VisitType::FollowUp,
        },
    ]
}

/// Pacientes com histórico
pub fn patients() -> Vec<Patient> {
    vec![
        Patient {
            patient_id: "P001".to_string(),
            name: "John Doe".to_string(),
            medical_history: vec![MedicalHistoryEntry {
                date: NaiveDate::from_ymd_opt(2024, 4, 20).unwrap_or(NaiveDate::MIN),
                diagnosis: "Common Cold".to_string(),
                notes: "Prescribed rest and fluids.".to_string(),
                medications: vec!["Rest".to_string(), "Fluids".to_string()],
            }],
        },
        Patient {
            patient_id: "P002".to_string(),
            name: "Jane Smith".to_string(),
            medical_history: vec![],
        },
    ]
}

/// Busca um paciente pelo identificador
pub fn find_patient(patient_id: &str) -> Option<Patient> {
    patients().into_iter().find(|p| p.patient_id == patient_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appointments_reference_known_doctors() {
        for appt in appointments() {
            assert!(DOCTORS.contains(&appt.doctor.as_str()), "{}", appt.doctor);
        }
    }

    #[test]
    fn appointments_reference_known_patients() {
        for appt in appointments() {
            assert!(find_patient(&appt.patient_id).is_some());
        }
    }

    #[test]
    fn john_doe_has_history() {
        let john = find_patient("P001").unwrap();
        assert_eq!(john.medical_history.len(), 1);
        assert_eq!(john.medical_history[0].diagnosis, "Common Cold");
    }
}
