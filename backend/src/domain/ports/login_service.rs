//! Driving port for exchanging credentials for a bearer token.
//!
//! Handlers depend on this trait rather than on the identity service so
//! their tests can substitute a double without hashing or storage.

use async_trait::async_trait;

use crate::domain::{AccessToken, Error, LoginCredentials};

#[async_trait]
pub trait LoginService: Send + Sync {
    /// Authenticate and issue a token. Every credential failure is reported
    /// identically as unauthorized.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error>;
}
