//! bb8 pool of `diesel-async` PostgreSQL connections.
//!
//! Every repository call goes through [`DbPool::within`], which bounds the
//! whole operation (checkout plus queries) by the configured store timeout.
//! A call that runs out of time is reported as a connection failure so the
//! caller sees a retryable error. A connection dropped inside an open
//! transaction is reported broken and discarded by the pool.

use std::future::Future;
use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },

    #[error("failed to build connection pool: {message}")]
    Build { message: String },
}

impl PoolError {
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    /// Human-readable cause without the variant prefix.
    pub fn into_message(self) -> String {
        match self {
            Self::Checkout { message } | Self::Build { message } => message,
        }
    }
}

/// Pool sizing and timing.
///
/// ```
/// use std::time::Duration;
/// use backpacker_connect::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://localhost/backpacker")
///     .with_max_size(4)
///     .with_store_timeout(Duration::from_millis(750));
/// assert_eq!(config.max_size(), 4);
/// assert_eq!(config.store_timeout(), Duration::from_millis(750));
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    store_timeout: Duration,
}

impl PoolConfig {
    /// Ten connections, two idle, five second store timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: 10,
            min_idle: Some(2),
            store_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.min_idle = min_idle;
        self
    }

    /// Upper bound on a single repository operation, checkout included.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    pub fn store_timeout(&self) -> Duration {
        self.store_timeout
    }
}

#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
    store_timeout: Duration,
}

impl DbPool {
    /// Build the pool and open `min_idle` connections, so an unreachable
    /// database fails here when `min_idle` is set.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
        let inner = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.store_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        Ok(Self {
            inner,
            store_timeout: config.store_timeout,
        })
    }

    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }

    /// Run `operation` under the store timeout; on expiry return
    /// `timed_out` built from a description of the elapsed budget.
    pub async fn within<T, E, F>(
        &self,
        operation: F,
        timed_out: impl FnOnce(String) -> E,
    ) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        match tokio::time::timeout(self.store_timeout, operation).await {
            Ok(result) => result,
            Err(_) => {
                let budget_ms = self.store_timeout.as_millis();
                warn!(budget_ms, "store operation timed out");
                Err(timed_out(format!("store did not answer within {budget_ms} ms")))
            }
        }
    }
}
