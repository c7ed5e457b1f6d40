//! Driving port for account sign-up.

use async_trait::async_trait;

use crate::domain::{Error, RegistrationRequest, User};

#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Create an account. Taken emails and usernames are conflicts.
    async fn register(&self, request: RegistrationRequest) -> Result<User, Error>;
}
