//! Server configuration for `rolegate`.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `ROLEGATE_*` environment variables.

use std::net::SocketAddr;
use std::time::Duration;

/// Default listen port.
const DEFAULT_PORT: u16 = 8300;

/// Configuration that cannot be started with.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `ROLEGATE_STORAGE` names no known backend.
    #[error("unknown ROLEGATE_STORAGE value '{value}' (expected 'memory' or 'postgres')")]
    UnknownStorageBackend { value: String },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Role store backend.
    pub storage_backend: StorageBackendType,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Identity provider settings. `None` means the server is not configured.
    pub identity: Option<IdentityConfig>,
    /// Browser origins allowed by CORS, beyond loopback.
    pub allowed_origins: Vec<String>,
    /// Maximum in-flight requests on the bootstrap endpoint.
    pub max_concurrent_requests: usize,
}

/// Where to exchange bearer tokens for subject identifiers.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Base URL of the identity provider (e.g., `https://project.example.co`).
    pub auth_url: String,
    /// Public API key sent alongside the bearer token.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("auth_url", &self.auth_url)
            .field("api_key", &"[redacted]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Supported role store backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// In-memory (development only, grants lost on restart).
    Memory,
    /// PostgreSQL `user_roles` table.
    Postgres { url: String },
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - `PORT` — port to bind on (binds to `0.0.0.0`)
    /// - `ROLEGATE_BIND_ADDR` — full bind address (overrides `PORT`, default: `127.0.0.1:8300`)
    /// - `ROLEGATE_STORAGE` — `memory` or `postgres` (default: `memory`, anything else is an error)
    /// - `DATABASE_URL` — PostgreSQL connection string (used when `ROLEGATE_STORAGE=postgres`)
    /// - `ROLEGATE_LOG_LEVEL` — log filter (default: `info`)
    /// - `ROLEGATE_AUTH_URL` — identity provider base URL (required)
    /// - `ROLEGATE_AUTH_API_KEY` — public API key for the identity provider
    /// - `ROLEGATE_AUTH_TIMEOUT_SECS` — identity request timeout (default: `10`)
    /// - `ROLEGATE_ALLOWED_ORIGINS` — comma-separated CORS allowlist
    /// - `ROLEGATE_MAX_CONCURRENT` — in-flight request limit (default: `32`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownStorageBackend`] for an unrecognised
    /// `ROLEGATE_STORAGE` value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Priority: ROLEGATE_BIND_ADDR > PORT > default 127.0.0.1:8300
        let bind_addr = if let Some(addr) = lookup("ROLEGATE_BIND_ADDR") {
            addr.parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))
        } else if let Some(port_str) = lookup("PORT") {
            let port: u16 = port_str.parse().unwrap_or(DEFAULT_PORT);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))
        };

        // Unrecognised values are an error, never a fallback to memory.
        let storage = lookup("ROLEGATE_STORAGE").unwrap_or_else(|| "memory".to_owned());
        let storage_backend = match storage.trim().to_lowercase().as_str() {
            "memory" => StorageBackendType::Memory,
            "postgres" | "postgresql" => {
                let url = lookup("DATABASE_URL")
                    .unwrap_or_else(|| "postgres://localhost/rolegate".to_owned());
                StorageBackendType::Postgres { url }
            }
            _ => return Err(ConfigError::UnknownStorageBackend { value: storage }),
        };

        let log_level = lookup("ROLEGATE_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        let identity = lookup("ROLEGATE_AUTH_URL")
            .filter(|url| !url.trim().is_empty())
            .map(|auth_url| IdentityConfig {
                auth_url,
                api_key: lookup("ROLEGATE_AUTH_API_KEY").unwrap_or_default(),
                timeout: Duration::from_secs(
                    lookup("ROLEGATE_AUTH_TIMEOUT_SECS")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(10),
                ),
            });

        let allowed_origins = lookup("ROLEGATE_ALLOWED_ORIGINS")
            .map(|raw| parse_list(&raw))
            .unwrap_or_default();

        let max_concurrent_requests = lookup("ROLEGATE_MAX_CONCURRENT")
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(32);

        Ok(Self {
            bind_addr,
            storage_backend,
            log_level,
            identity,
            allowed_origins,
            max_concurrent_requests,
        })
    }
}

/// Split a comma-separated list, dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
