use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidrelay_api::background;
use vidrelay_api::config::ServerConfig;
use vidrelay_api::router::build_app_router;
use vidrelay_api::state::{AppState, JobBackend};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "vidrelay_api=debug,vidrelay_core=debug,vidrelay_upstream=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        mode = config.mode.as_str(),
        "Loaded server configuration"
    );

    // --- Job backend ---
    let backend = JobBackend::from_config(&config).expect("Failed to build job backend");

    // --- Retention sweep (simulate mode only) ---
    let retention_cancel = tokio_util::sync::CancellationToken::new();
    let retention_handle = match &backend {
        JobBackend::Simulated(jobs) => Some(tokio::spawn(background::job_retention::run(
            Arc::clone(jobs),
            config.sweep_interval,
            retention_cancel.clone(),
        ))),
        JobBackend::Proxy(_) => None,
    };

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        backend: backend.clone(),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    retention_cancel.cancel();
    if let Some(handle) = retention_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Job retention task stopped");
    }

    if let JobBackend::Simulated(jobs) = &backend {
        jobs.shutdown().await;
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
