//! Configuração do serviço lida das variáveis de ambiente

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clinic_core::DbConfig;

/// Configuração do serviço de recepção
#[derive(Debug, Clone)]
pub struct FrontdeskConfig {
    /// Endereço de escuta do servidor HTTP
    pub bind_addr: SocketAddr,
    /// Banco de dados dos registros
    pub db: DbConfig,
    /// Base do backend consultado pelo painel e pela visualização da receita
    pub backend_url: String,
    /// Base pública usada para montar as URLs seguras
    pub public_url: String,
    /// Tempo máximo de cada requisição ao backend
    pub backend_timeout: Duration,
    /// Logs em JSON
    pub log_json: bool,
    /// Máximo de requisições simultâneas
    pub concurrency_limit: usize,
}

impl FrontdeskConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Monta a configuração a partir de uma função de consulta (facilita testes)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr: SocketAddr = lookup("CLINIC_BIND_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
            .parse()
            .context("CLINIC_BIND_ADDR inválido")?;

        let mut db = DbConfig::default();
        if let Some(path) = lookup("CLINIC_DB_PATH") {
            db.db_path = path;
        }
        if let Some(max) = lookup("CLINIC_DB_MAX_CONNECTIONS") {
            db.max_connections = max.parse().context("CLINIC_DB_MAX_CONNECTIONS inválido")?;
        }

        let backend_url = lookup("CLINIC_BACKEND_URL")
            .unwrap_or_else(|| format!("http://{}", bind_addr))
            .trim_end_matches('/')
            .to_string();
        let public_url = lookup("CLINIC_PUBLIC_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| backend_url.clone());

        let backend_timeout = match lookup("CLINIC_BACKEND_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(secs.parse().context("CLINIC_BACKEND_TIMEOUT_SECS inválido")?),
            None => Duration::from_secs(10),
        };

        let log_json = matches!(lookup("CLINIC_LOG_JSON").as_deref(), Some("1") | Some("true"));

        let concurrency_limit = match lookup("CLINIC_CONCURRENCY_LIMIT") {
            Some(n) => n.parse().context("CLINIC_CONCURRENCY_LIMIT inválido")?,
            None => 256,
        };

        Ok(Self {
            bind_addr,
            db,
            backend_url,
            public_url,
            backend_timeout,
            log_json,
            concurrency_limit,
        })
    }
}
