use std::net::SocketAddr;

use billing_api::{
    build_router, config::Settings, observability::init_tracing, services::Database, AppState,
};
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), billing_api::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = Settings::load()?;

    init_tracing(&config.log_level);

    tracing::info!(service = %config.service_name, "Starting billing back-office service");

    let db = Database::new(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;

    db.run_migrations().await?;
    tracing::info!("Database initialized successfully");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState { config, db };
    let app = build_router(state);

    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
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
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
