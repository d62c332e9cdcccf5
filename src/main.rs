use std::net::SocketAddr;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};

use lto_records::config::{DatabaseConfig, EnvironmentConfig};
use lto_records::services::status_sweeper::spawn_status_sweeper;
use lto_records::state::AppState;
use lto_records::{create_app, database};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level())
        .init();

    info!("🚗 LTO Records - vehicle & owner registration");
    info!("Environment: {}", config.environment);

    let database_config = DatabaseConfig::from_env()?;
    let pool = match database::connect(&database_config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Database unavailable: {:#}", e);
            return Err(e);
        }
    };

    let state = AppState::new(pool.clone(), config.clone());

    match config.status_sweep_interval() {
        Some(every) => {
            info!("🧹 Status sweep every {}s", every.as_secs());
            spawn_status_sweeper(pool, state.actors.clone(), state.audit.clone(), every);
        }
        None => info!("🧹 Background status sweep disabled"),
    }

    let app = create_app(state);

    let addr: SocketAddr = config.server_url().parse()?;
    info!("🌐 Server listening on http://{}", addr);
    info!("   /health, /api/vehicles, /api/owners");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Server error: {}", e);
            e
        })?;

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("🛑 Ctrl+C received, shutting down..."),
        _ = terminate => info!("🛑 SIGTERM received, shutting down..."),
    }
}
