//! Clinic Core - Biblioteca compartilhada com o domínio da recepção da clínica
//!
//! Esta biblioteca fornece:
//! - Modelos de dados compartilhados e os dados fixos do dia
//! - Check-in de pacientes por nome, contato e médico
//! - Geração dos horários de agendamento
//! - Formulários de cadastro, agendamento e consulta, com campos derivados
//!   (idade e total da cobrança)
//! - Persistência em SQLite dos registros de consulta

pub mod billing;
pub mod checkin;
pub mod consultation;
pub mod db;
pub mod error;
pub mod migrations;
pub mod mock_data;
pub mod models;
pub mod registration;
pub mod repository;
pub mod scheduling;
pub mod validation;

pub use db::{init_db_pool, DbConfig};
pub use error::{ClinicError, FieldError, Result};
