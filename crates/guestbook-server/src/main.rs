use anyhow::{Context, Result};
use clap::Parser;
use guestbook_core::{ArchivalStore, StoreHandle};
use guestbook_server::cli::Cli;
use guestbook_server::config::ServerConfig;
use guestbook_server::router;
use guestbook_server::routes::AppState;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let file_config = ServerConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let config = file_config.merge(&cli.overrides());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = config.data_dir();
    info!(
        data_dir = %data_dir.display(),
        max_active_entries = config.storage.max_active_entries(),
        "opening guestbook store"
    );
    let store = ArchivalStore::open(&data_dir, config.storage.clone())?;

    // A lowered cap takes effect before the first request.
    let report = store.enforce_cap()?;
    if !report.is_empty() {
        info!(archived = report.archived, "archived entries above the cap");
    }

    let handle = StoreHandle::spawn(store).context("starting store writer")?;
    let app = router(AppState::new(handle), config.static_dir.as_deref());

    let addr: SocketAddr = config
        .listen()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.listen()))?;
    let listener = TcpListener::bind(addr).await?;
    info!("guestbook listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("shutting down");
        })
        .await?;

    info!("guestbook server stopped");
    Ok(())
}
