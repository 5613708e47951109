//! TaskFlow server binary.
//!
//! Reads configuration from the environment (and `.env`, when present); see
//! `taskflow_backend::config` for the variables. Logging is controlled by
//! `RUST_LOG`.

use shared::TASKS_PATH;
use taskflow_backend::{router, store, AppState, Config, StorageMode};
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskflow_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "configuration error");
            std::process::exit(1);
        }
    };

    let store = match store::open(&config) {
        Ok(store) => store,
        Err(error) => {
            tracing::error!(%error, "failed to open task store");
            std::process::exit(1);
        }
    };
    match config.storage {
        StorageMode::File => {
            tracing::info!(storage = store.describe(), path = %config.db_path.display(), "task store ready");
        }
        StorageMode::Memory => {
            tracing::warn!(storage = store.describe(), "task store ready; tasks will not survive a restart");
        }
        StorageMode::Redis => {
            tracing::info!(storage = store.describe(), key = %config.redis_key, "task store ready");
        }
    }

    let app = router(AppState::new(store), &config.static_dir);

    let listener = match TcpListener::bind(config.bind_address()).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, address = %config.bind_address(), "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!("TaskFlow server running at http://localhost:{}", config.port);
    tracing::info!("API endpoint available at http://localhost:{}{}", config.port, TASKS_PATH);

    if let Err(error) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "server error");
        std::process::exit(1);
    }

    tracing::info!("Server closed");
}

/// Resolves on Ctrl+C, or on SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler");
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

    tracing::info!("Server shutting down gracefully...");
}
