//! Sistema de migrações para banco de dados
//!
//! Este módulo gerencia as migrações do banco de dados SQLite.
//! A versão aplicada fica em `PRAGMA user_version`.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{error, info};

/// Lista de migrações SQL a serem aplicadas
const MIGRATIONS: &[&str] = &[
    // 001_frontdesk_schema.sql
    r#"
    -- Pacientes cadastrados na recepção
    CREATE TABLE IF NOT EXISTS patients (
        id TEXT PRIMARY KEY NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        dob DATE,
        age INTEGER,
        contact_number TEXT NOT NULL,
        email TEXT NOT NULL,
        registration_json TEXT NOT NULL -- formulário completo
    );

    -- Consultas registradas
    CREATE TABLE IF NOT EXISTS consultations (
        id TEXT PRIMARY KEY NOT NULL,
        token TEXT NOT NULL UNIQUE,
        patient_id TEXT NOT NULL,
        created_at TIMESTAMP NOT NULL,
        diagnosis TEXT NOT NULL,
        notes TEXT NOT NULL DEFAULT '',
        prescriptions_json TEXT NOT NULL,
        lab_tests_json TEXT NOT NULL,
        follow_up_date TIMESTAMP,
        selected_test TEXT,
        total INTEGER NOT NULL,
        secure_url TEXT NOT NULL
    );

    -- Índices para otimização
    CREATE INDEX IF NOT EXISTS idx_consultations_patient_id ON consultations (patient_id);
    CREATE INDEX IF NOT EXISTS idx_consultations_created_at ON consultations (created_at);
    "#,
];

/// Executa todas as migrações pendentes no banco de dados
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Aplicando migrações de banco de dados...");

    // Obter a versão atual do banco de dados
    let mut version: i64 = 0;
    match sqlx::query_scalar("PRAGMA user_version").fetch_one(pool).await {
        Ok(v) => version = v,
        Err(e) => {
            // pode ser a primeira execução
            error!("Erro ao obter versão do banco: {}", e);
        }
    }

    info!("Versão atual do banco: {}", version);

    for (i, migration_sql) in MIGRATIONS.iter().enumerate() {
        let migration_version = (i + 1) as i64;

        if migration_version <= version {
            info!("Migração {} já aplicada", migration_version);
            continue;
        }

        info!("Aplicando migração {}...", migration_version);

        let mut transaction = pool
            .begin()
            .await
            .with_context(|| format!("Falha ao iniciar transação para migração {}", migration_version))?;

        sqlx::query(migration_sql)
            .execute(&mut *transaction)
            .await
            .with_context(|| format!("Falha ao executar migração {}", migration_version))?;

        sqlx::query(&format!("PRAGMA user_version = {}", migration_version))
            .execute(&mut *transaction)
            .await
            .with_context(|| format!("Falha ao atualizar versão para {}", migration_version))?;

        transaction
            .commit()
            .await
            .with_context(|| format!("Falha ao confirmar transação para migração {}", migration_version))?;

        info!("Migração {} aplicada com sucesso", migration_version);
    }

    info!("Migrações concluídas. Versão atual: {}", MIGRATIONS.len());
    Ok(())
}
