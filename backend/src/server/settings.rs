//! Runtime settings loaded via OrthoConfig from flags, `BACKPACKER_*`
//! environment variables and an optional config file.

use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_TTL_MINUTES: u64 = 7 * 24 * 60;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const MAX_TOKEN_TTL_MINUTES: u64 = 366 * 24 * 60;

/// Token lifetime outside `1..=MAX_TOKEN_TTL_MINUTES`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("token_ttl_minutes must be between 1 and {max}, got {minutes}")]
pub struct TokenTtlError {
    minutes: u64,
    max: u64,
}

/// Process configuration for the API server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BACKPACKER")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL; in-memory stores are used when unset.
    pub database_url: Option<String>,
    /// HMAC secret for signing access tokens.
    pub jwt_secret: Option<String>,
    /// Access token lifetime in minutes.
    pub token_ttl_minutes: Option<u64>,
    /// Upper bound on a single store operation in milliseconds.
    pub store_timeout_ms: Option<u64>,
    /// Maximum pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Apply embedded migrations at startup; defaults to true.
    pub run_migrations: Option<bool>,
    /// Permit a random signing secret when `jwt_secret` is unset.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secret: bool,
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
    }

    /// Access token lifetime; at most 366 days.
    pub fn token_ttl(&self) -> Result<chrono::Duration, TokenTtlError> {
        let minutes = self.token_ttl_minutes.unwrap_or(DEFAULT_TOKEN_TTL_MINUTES);
        let out_of_range = TokenTtlError {
            minutes,
            max: MAX_TOKEN_TTL_MINUTES,
        };
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes) {
            return Err(out_of_range);
        }
        i64::try_from(minutes)
            .ok()
            .and_then(chrono::Duration::try_minutes)
            .ok_or(out_of_range)
    }

    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms.unwrap_or(DEFAULT_STORE_TIMEOUT_MS))
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// A configured, non-blank signing secret.
    pub fn jwt_secret(&self) -> Option<&str> {
        self.jwt_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
    }
}
