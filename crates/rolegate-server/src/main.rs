//! `rolegate` server entry point.
//!
//! Opens the role store, builds the identity provider client, and serves the
//! bootstrap endpoint with graceful shutdown.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use rolegate_core::BootstrapService;
use rolegate_server::config::{ServerConfig, StorageBackendType};
use rolegate_server::cors::OriginPolicy;
use rolegate_server::identity::HttpIdentityProvider;
use rolegate_server::routes;
use rolegate_server::state::AppState;
use rolegate_storage::{MemoryRoleStore, RoleStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment.
    let config = ServerConfig::from_env().context("invalid configuration")?;

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(storage = ?config.storage_backend, "rolegate starting");

    let state = build_app_state(&config).await?;
    let origins = OriginPolicy::new(&config.allowed_origins);
    let app = routes::build_router(state, origins, config.max_concurrent_requests);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "rolegate listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("rolegate stopped");
    Ok(())
}

/// Build the shared application state.
async fn build_app_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let Some(identity_config) = &config.identity else {
        anyhow::bail!("server not configured: ROLEGATE_AUTH_URL is required");
    };

    let roles: Arc<dyn RoleStore> = match &config.storage_backend {
        StorageBackendType::Memory => {
            warn!(
                "using in-memory role store: grants are lost on restart and \
                 first-admin signup reopens"
            );
            Arc::new(MemoryRoleStore::new())
        }
        #[cfg(feature = "postgres-backend")]
        StorageBackendType::Postgres { url } => {
            info!(url = %"[redacted]", "using PostgreSQL role store");
            Arc::new(
                rolegate_storage::PostgresRoleStore::connect(url)
                    .await
                    .context("failed to connect to PostgreSQL role store")?,
            )
        }
        #[cfg(not(feature = "postgres-backend"))]
        StorageBackendType::Postgres { .. } => {
            anyhow::bail!(
                "PostgreSQL backend requested but feature 'postgres-backend' is not enabled"
            );
        }
    };

    let identity = HttpIdentityProvider::new(identity_config)
        .context("failed to build identity provider client")?;
    info!(auth_url = %identity_config.auth_url, "identity provider configured");

    let bootstrap = BootstrapService::new(Arc::new(identity), roles);

    Ok(Arc::new(AppState { bootstrap }))
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
