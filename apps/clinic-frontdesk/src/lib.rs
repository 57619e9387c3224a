//! Clinic Frontdesk - serviço HTTP da recepção da clínica
//!
//! Expõe em JSON o check-in, a agenda, o cadastro de pacientes, a cobrança e
//! o registro de consultas, além das páginas do painel da equipe e da receita.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod router;
pub mod state;
pub mod telemetry;
pub mod views;

pub use config::FrontdeskConfig;
pub use router::build_router;
pub use state::AppState;
