//! NotifyHub Server: real-time user notifications over WebSocket.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use notifyhub_api::{AppState, build_app};
use notifyhub_core::config::{AppConfig, StoreBackend};
use notifyhub_core::error::AppError;
use notifyhub_database::{
    DatabasePool, MemoryNotificationStore, MemorySessionRegistry, NotificationStore,
    SessionRegistry,
};
use notifyhub_realtime::RealtimeEngine;
use notifyhub_service::NotificationService;

#[tokio::main]
async fn main() {
    let env = std::env::var("NOTIFYHUB_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Stores selected by `[database] backend`.
struct Stores {
    db_pool: Option<Arc<DatabasePool>>,
    registry: Arc<dyn SessionRegistry>,
    notifications: Arc<dyn NotificationStore>,
}

/// Open the configured store backend.
async fn open_stores(config: &AppConfig) -> Result<Stores, AppError> {
    match config.database.backend {
        StoreBackend::Postgres => {
            let pool = DatabasePool::open(&config.database).await?;
            Ok(Stores {
                registry: pool.session_registry(),
                notifications: pool.notification_store(),
                db_pool: Some(Arc::new(pool)),
            })
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; presence and notifications are lost on restart");
            Ok(Stores {
                db_pool: None,
                registry: Arc::new(MemorySessionRegistry::new()),
                notifications: Arc::new(MemoryNotificationStore::new()),
            })
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting NotifyHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Stores ───────────────────────────────────────────
    let stores = open_stores(&config).await?;

    // ── Step 2: Realtime engine and services ─────────────────────
    let realtime = RealtimeEngine::new(config.realtime.clone(), stores.registry);
    let notification_service = NotificationService::new(stores.notifications, realtime.clone());

    // ── Step 3: HTTP server ──────────────────────────────────────
    let config = Arc::new(config);
    let state = AppState::new(
        Arc::clone(&config),
        stores.db_pool.clone(),
        realtime.clone(),
        notification_service,
    );
    let app = build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(addr = %addr, "NotifyHub server listening");

    // ── Step 4: Graceful shutdown ────────────────────────────────
    let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();
    let engine = realtime.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        // Closing the sockets lets their upgrade handlers return.
        if let Err(e) = engine.shutdown().await {
            tracing::error!(error = %e, "Realtime engine shutdown failed");
        }
        let _ = signal_tx.send(());
    });
    let mut server_task = tokio::spawn(async move { server.await });

    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let served = tokio::select! {
        res = &mut server_task => Some(res),
        _ = signal_rx => match tokio::time::timeout(grace, &mut server_task).await {
            Ok(res) => Some(res),
            Err(_) => {
                tracing::warn!(grace_seconds = grace.as_secs(), "Grace period elapsed, aborting server");
                server_task.abort();
                None
            }
        },
    };

    // ── Step 5: Close resources ──────────────────────────────────
    if let Some(pool) = stores.db_pool {
        pool.close().await;
    }

    match served {
        Some(Ok(Ok(()))) | None => {
            tracing::info!("NotifyHub server shut down gracefully");
            Ok(())
        }
        Some(Ok(Err(e))) => Err(AppError::internal(format!("Server error: {e}"))),
        Some(Err(e)) => Err(AppError::internal(format!("Server task failed: {e}"))),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
