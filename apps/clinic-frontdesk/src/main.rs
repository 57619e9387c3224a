use anyhow::{Context, Result};
use clinic_core::checkin::CheckInDesk;
use clinic_frontdesk::backend::BackendClient;
use clinic_frontdesk::{build_router, telemetry, AppState, FrontdeskConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = FrontdeskConfig::from_env()?;
    telemetry::init_tracing(config.log_json);

    let pool = clinic_core::init_db_pool(&config.db).await?;
    let backend = BackendClient::new(&config.backend_url, config.backend_timeout)
        .context("Falha ao criar cliente do backend")?;

    let state = AppState::new(CheckInDesk::with_mock_data(), pool, backend, &config.public_url);
    let app = build_router(state, config.concurrency_limit);

    info!(
        addr = %config.bind_addr,
        backend = %config.backend_url,
        "Recepção da clínica ouvindo"
    );

    axum::Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Falha no servidor HTTP")?;

    info!("Servidor encerrado");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Falha ao aguardar sinal de encerramento: {}", e);
    }
}
