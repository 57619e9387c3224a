//! Formulário de consulta
//!
//! Diagnóstico, observações, lista de medicamentos, lista de exames (que pode
//! ser dispensada pelo paciente), retorno opcional e cobrança derivada da
//! tabela de preços. O envio gera um retrato imutável e limpa o rascunho.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use crate::billing;
use crate::error::{flatten_validation, ClinicError, FieldError, Result};
use crate::models::{LabTest, Prescription};
use crate::validation::{is_blank, not_blank, REQUIRED};

const PRESCRIPTION_INCOMPLETE: &str = "All fields are required";
const LAB_TEST_INCOMPLETE: &str = "Test Name and Instructions are required";

/// Rascunho da consulta em andamento
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsultationDraft {
    #[validate(custom = "not_blank")]
    pub diagnosis: String,
    pub notes: String,
    #[validate(length(min = 1, message = "At least one medication is required"))]
    pub prescriptions: Vec<Prescription>,
    pub lab_tests: Vec<LabTest>,
    /// Paciente prefere fazer os exames fora; o acompanhamento não é feito
    pub opt_out_monitoring: bool,
    pub follow_up: bool,
    pub follow_up_date: Option<NaiveDateTime>,
    pub selected_test: Option<String>,
    #[serde(skip_deserializing)]
    pub total: u32,
}

impl Default for ConsultationDraft {
    fn default() -> Self {
        Self {
            diagnosis: String::new(),
            notes: String::new(),
            prescriptions: vec![Prescription::default()],
            lab_tests: vec![LabTest::default()],
            opt_out_monitoring: false,
            follow_up: false,
            follow_up_date: None,
            selected_test: None,
            total: billing::CONSULTATION_FEE,
        }
    }
}

/// Retrato da consulta enviada
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationSnapshot {
    pub diagnosis: String,
    pub notes: String,
    pub prescriptions: Vec<Prescription>,
    pub lab_tests: Vec<LabTest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_date: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_test: Option<String>,
    pub total: u32,
}

impl ConsultationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_prescription(&mut self) {
        self.prescriptions.push(Prescription::default());
    }

    pub fn remove_prescription(&mut self, index: usize) -> Option<Prescription> {
        (index < self.prescriptions.len()).then(|| self.prescriptions.remove(index))
    }

    pub fn add_lab_test(&mut self) {
        self.lab_tests.push(LabTest::default());
    }

    pub fn remove_lab_test(&mut self, index: usize) -> Option<LabTest> {
        (index < self.lab_tests.len()).then(|| self.lab_tests.remove(index))
    }

    pub fn set_opt_out_monitoring(&mut self, opt_out: bool) {
        self.opt_out_monitoring = opt_out;
    }

    pub fn set_follow_up(&mut self, enabled: bool, date: Option<NaiveDateTime>) {
        self.follow_up = enabled;
        self.follow_up_date = date;
    }

    /// Seleciona o exame cobrado e recalcula o total
    pub fn select_test(&mut self, test: Option<&str>) -> Result<u32> {
        let test = test.filter(|t| !is_blank(t));
        let total = billing::total(test)?;
        self.selected_test = test.map(str::to_string);
        self.total = total;
        debug!(total, "Total da consulta recalculado");
        Ok(total)
    }

    // opção em branco equivale a nenhum exame
    fn chosen_test(&self) -> Option<&str> {
        self.selected_test.as_deref().filter(|t| !is_blank(t))
    }

    fn check(&self) -> (Vec<FieldError>, Vec<LabTest>) {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => flatten_validation(&e),
        };

        for (i, p) in self.prescriptions.iter().enumerate() {
            if is_blank(&p.medication_name) || is_blank(&p.dosage_instructions) || is_blank(&p.duration) {
                errors.push(FieldError::new(format!("prescriptions[{}]", i), PRESCRIPTION_INCOMPLETE));
            }
        }

        let mut lab_tests = Vec::new();
        if !self.opt_out_monitoring {
            for (i, test) in self.lab_tests.iter().enumerate() {
                match (is_blank(&test.test_name), is_blank(&test.test_instructions)) {
                    // linha vazia
                    (true, true) => {}
                    (false, false) => lab_tests.push(LabTest {
                        test_name: test.test_name.trim().to_string(),
                        test_instructions: test.test_instructions.clone(),
                        lab_results_url: test
                            .lab_results_url
                            .as_ref()
                            .filter(|url| !is_blank(url))
                            .cloned(),
                    }),
                    _ => errors.push(FieldError::new(format!("lab_tests[{}]", i), LAB_TEST_INCOMPLETE)),
                }
            }
        }

        if self.follow_up && self.follow_up_date.is_none() {
            errors.push(FieldError::new("follow_up_date", REQUIRED));
        }

        if let Err(ClinicError::UnknownTest(name)) = billing::total(self.chosen_test()) {
            errors.push(FieldError::new("selected_test", format!("Exame desconhecido: {}", name)));
        }

        (errors, lab_tests)
    }

    /// Valida o rascunho e devolve o retrato enviado
    ///
    /// Com `opt_out_monitoring` ligado, nenhum exame é enviado. Em caso de
    /// erro o rascunho permanece como está; em caso de sucesso volta ao padrão.
    pub fn submit(&mut self) -> Result<ConsultationSnapshot> {
        let (errors, lab_tests) = self.check();
        if !errors.is_empty() {
            return Err(ClinicError::Validation(errors));
        }

        let selected_test = self.chosen_test().map(str::to_string);
        let total = billing::total(selected_test.as_deref())?;
        let draft = std::mem::take(self);
        let snapshot = ConsultationSnapshot {
            diagnosis: draft.diagnosis,
            notes: draft.notes,
            prescriptions: draft.prescriptions,
            lab_tests,
            follow_up_date: if draft.follow_up { draft.follow_up_date } else { None },
            selected_test,
            total,
        };

        info!(
            prescriptions = snapshot.prescriptions.len(),
            lab_tests = snapshot.lab_tests.len(),
            total = snapshot.total,
            "Consulta registrada"
        );
        Ok(snapshot)
    }
}
