//! Backend entry-point: loads settings, prepares the store and serves the
//! REST API with health checks and OpenAPI docs.

mod server;

use std::io;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backpacker_connect::inbound::http::health::HealthState;
use backpacker_connect::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{AppSettings, ServerConfig, build_states, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|e| io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| io::Error::other(format!("invalid bind address: {e}")))?;

    let token_ttl = settings
        .token_ttl()
        .map_err(|e| io::Error::other(format!("invalid token lifetime: {e}")))?;
    let mut config = ServerConfig::new(bind_addr, signing_secret(&settings)?, token_ttl);
    if let Some(url) = settings.database_url.as_deref() {
        config = config.with_db_pool(prepare_store(&settings, url).await?);
    }

    let (health_state, http_state) = build_states(&config);
    let server = create_server(health_state.clone(), http_state, &config)?;
    info!(%bind_addr, "listening");

    let handle = server.handle();
    actix_web::rt::spawn(drain_on_signal(health_state, handle));
    server.await
}

/// The configured JWT secret, or a random one where that is permitted.
fn signing_secret(settings: &AppSettings) -> io::Result<Vec<u8>> {
    if let Some(secret) = settings.jwt_secret() {
        return Ok(secret.as_bytes().to_vec());
    }
    if cfg!(debug_assertions) || settings.allow_ephemeral_secret {
        warn!("using temporary JWT signing secret; tokens will not survive a restart");
        return Ok(rand::random::<[u8; 32]>().to_vec());
    }
    Err(io::Error::other(
        "BACKPACKER_JWT_SECRET must be set (or BACKPACKER_ALLOW_EPHEMERAL_SECRET=true)",
    ))
}

async fn prepare_store(settings: &AppSettings, url: &str) -> io::Result<DbPool> {
    if settings.run_migrations() {
        run_pending_migrations(url)
            .await
            .map_err(|e| io::Error::other(e.to_string()))?;
    }
    DbPool::new(
        PoolConfig::new(url)
            .with_max_size(settings.db_max_connections())
            .with_store_timeout(settings.store_timeout()),
    )
    .await
    .map_err(|e| io::Error::other(e.to_string()))
}

/// Fail liveness first, then let in-flight requests finish.
async fn drain_on_signal(health_state: web::Data<HealthState>, handle: actix_web::dev::ServerHandle) {
    if let Err(e) = shutdown_signal().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown requested; draining");
    health_state.mark_unhealthy();
    handle.stop(true).await;
}

#[cfg(unix)]
async fn shutdown_signal() -> io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> io::Result<()> {
    tokio::signal::ctrl_c().await
}
