//! Goal Achiever Pro calendar sync server.

use std::sync::Arc;

use anyhow::Context;
use goalpro_api::utils::logging::{init_tracing, LogFormat};
use goalpro_api::{router, AppContext};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment.
    let dotenv = dotenvy::dotenv();

    init_tracing(LogFormat::from_env());

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => info!(reason = %e, "no .env file loaded"),
    }

    let config = goalpro_infra::config::load().context("failed to load configuration")?;
    let bind = config.server.bind.clone();

    let (ctx, mut tasks) = AppContext::new(config).context("failed to initialise application")?;
    tasks.start().await.context("failed to start background tasks")?;

    let app = router(Arc::new(ctx));
    let listener =
        TcpListener::bind(&bind).await.with_context(|| format!("failed to bind {bind}"))?;
    info!(addr = %bind, "goalpro server listening");

    let served = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await;

    tasks.shutdown().await;
    info!("goalpro server stopped");
    served.context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
