use anyhow::Context;
use server::config::ServerConfig;
use server::{AppState, build_router};
use services::{AppServices, Clock, CredentialHasher};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = ServerConfig::from_env().context("invalid configuration")?;
    config.logging.init();

    if config.session.using_dev_secret {
        warn!("SESSION_SECRET is not set; using the development secret");
    }

    let services = AppServices::bootstrap(&config.storage, Clock::System, CredentialHasher::default())
        .await
        .context("failed to start services")?;
    let background = services.spawn_background(config.storage.reprobe_interval);
    info!(mode = services.storage_mode(), "storage ready");

    let app = build_router(AppState::from_config(services, &config));
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "career-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("server failed")?;

    for task in background {
        task.abort();
    }
    info!("shutdown complete");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
