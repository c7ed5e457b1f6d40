//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use backpacker_connect::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) jwt_secret: Vec<u8>,
    pub(crate) token_ttl: chrono::Duration,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration with the token signing policy.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, jwt_secret: Vec<u8>, token_ttl: chrono::Duration) -> Self {
        Self {
            bind_addr,
            jwt_secret,
            token_ttl,
            db_pool: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without one the server runs on in-memory stores.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
