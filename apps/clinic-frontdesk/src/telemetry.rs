//! Inicialização dos logs

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Configura o `tracing` com filtro via `RUST_LOG` (padrão `info`)
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
