//! # launchpad
//!
//! Assembles the server from the compiled-in adapters: settings, tracing,
//! the Entity Store, credential adapters, services and the axum router.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::{build_router, AppState, Metrics};
use auth_adapters::{Argon2Hasher, JwtCodec};
use configs::{LogFormat, LogSettings, Settings};
use domains::Store;
use secrecy::ExposeSecret;
use services::Services;
use storage_adapters::MemoryStore;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.log);

    let store = open_store(&settings).await?;
    let tokens = JwtCodec::new(
        settings.auth.jwt_secret.expose_secret().as_bytes(),
        settings.auth.token_ttl_hours,
    );
    let services = Services::new(store, Arc::new(Argon2Hasher::new()), Arc::new(tokens));
    let state = AppState::new(services, Metrics::new());
    let app = build_router(state, &settings.server.cors_origins);

    let addr = settings.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "launchpad listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("launchpad stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[cfg(feature = "db-postgres")]
async fn open_store(settings: &Settings) -> anyhow::Result<Store> {
    use storage_adapters::PgStore;

    let Some(url) = &settings.database.url else {
        warn!("no database.url configured, using the in-memory store");
        return Ok(Store::from_adapter(Arc::new(MemoryStore::default())));
    };
    let pg = PgStore::connect(url.expose_secret(), settings.database.max_connections)
        .await
        .context("connecting to postgres")?;
    pg.migrate().await.context("running migrations")?;
    info!("postgres store ready");
    Ok(Store::from_adapter(Arc::new(pg)))
}

#[cfg(not(feature = "db-postgres"))]
async fn open_store(settings: &Settings) -> anyhow::Result<Store> {
    if settings.uses_database() {
        anyhow::bail!("database.url is set but this build has no postgres support (enable `db-postgres`)");
    }
    warn!("using the in-memory store");
    Ok(Store::from_adapter(Arc::new(MemoryStore::default())))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        info!("received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
