//! # anon-board
//!
//! The entry point: loads settings, installs logging, picks the thread store,
//! injects it into the service and serves the JSON API.

use std::sync::Arc;

use anyhow::Context;
use configs::{LogFormat, Settings, StorageBackend};
use domains::ThreadRepository;
use services::BoardService;
use storage_adapters::MemoryThreadRepository;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(&settings);

    // 1. Initialize the store; the service only ever sees the port
    let repo = build_store(&settings).await?;

    // 2. Wire the service into the router
    let app = api_adapters::router(BoardService::new(repo));

    // 3. Serve until Ctrl-C / SIGTERM
    let addr = settings.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "anon-board listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;

    info!("shut down cleanly");
    Ok(())
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match settings.log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn build_store(settings: &Settings) -> anyhow::Result<Arc<dyn ThreadRepository>> {
    match settings.storage.backend {
        StorageBackend::Memory => {
            info!("using in-memory thread store, data is lost on restart");
            Ok(Arc::new(MemoryThreadRepository::new()))
        }
        StorageBackend::Postgres => connect_postgres(settings).await,
    }
}

#[cfg(feature = "db-postgres")]
async fn connect_postgres(settings: &Settings) -> anyhow::Result<Arc<dyn ThreadRepository>> {
    use secrecy::ExposeSecret;
    use std::time::Duration;

    let url = settings
        .storage
        .database_url
        .as_ref()
        .context("storage.database_url is not set")?;
    let repo = storage_adapters::PgThreadRepository::connect(
        url.expose_secret(),
        settings.storage.max_connections,
        Duration::from_secs(settings.storage.acquire_timeout_secs),
    )
    .await?;

    info!("using postgres thread store");
    Ok(Arc::new(repo))
}

#[cfg(not(feature = "db-postgres"))]
async fn connect_postgres(_settings: &Settings) -> anyhow::Result<Arc<dyn ThreadRepository>> {
    anyhow::bail!("postgres backend requested but this build lacks the `db-postgres` feature")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(%err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
