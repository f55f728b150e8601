//! NSPIRE Server — application entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use nspire_auth::AuthService;
use nspire_crm::GhlClient;
use nspire_server::config::ServerConfig;
use nspire_server::create_router;
use nspire_server::state::AppState;
use nspire_store::{InMemoryIdentityRepository, seed_demo_identities};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nspire=info,tower_http=info")),
        )
        .json()
        .init();

    tracing::info!("Starting NSPIRE server...");

    let config = ServerConfig::from_env()?;
    if config.auth.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; logins will fail until it is configured");
    }

    let crm = Arc::new(GhlClient::new(config.crm.clone())?);

    let identities = match config.auth.pepper.clone() {
        Some(pepper) => InMemoryIdentityRepository::with_pepper(pepper),
        None => InMemoryIdentityRepository::new(),
    };
    seed_demo_identities(&identities).await?;

    let auth = AuthService::new(identities, crm, config.auth.clone());
    let port = config.port;

    tracing::info!(
        port,
        frontend = %config.cors_origin,
        ghl_base = %config.crm.base_url,
        ghl_timeout_ms = config.crm.timeout_ms,
        freshness_window_secs = config.auth.freshness_window_secs,
        grace_period_hours = config.auth.grace_period_hours,
        renew_url = config.renew_url.as_deref().unwrap_or("-"),
        "configuration loaded"
    );

    let state = Arc::new(AppState::new(config, auth));
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "NSPIRE server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("NSPIRE server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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

    tracing::info!("shutdown signal received");
}
