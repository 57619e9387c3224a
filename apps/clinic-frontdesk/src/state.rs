//! Estado compartilhado entre os handlers

use std::sync::Arc;

use clinic_core::checkin::CheckInDesk;
use clinic_core::registration::{Clock, SystemClock};
use sqlx::SqlitePool;
use tokio::sync::RwLock;

use crate::backend::BackendClient;

#[derive(Clone)]
pub struct AppState {
    /// Balcão de check-in com os agendamentos do dia
    pub desk: Arc<RwLock<CheckInDesk>>,
    /// Banco dos registros de consulta e cadastros
    pub pool: SqlitePool,
    /// Cliente usado pelas páginas do painel e da receita
    pub backend: BackendClient,
    /// Base pública das URLs seguras
    pub public_url: Arc<str>,
    pub clock: Arc<dyn Clock + Send + Sync>,
}

impl AppState {
    pub fn new(desk: CheckInDesk, pool: SqlitePool, backend: BackendClient, public_url: &str) -> Self {
        Self {
            desk: Arc::new(RwLock::new(desk)),
            pool,
            backend,
            public_url: Arc::from(public_url),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }
}
