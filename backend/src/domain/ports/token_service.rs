//! Driven port for bearer token issuance and validation.

use crate::domain::{AccessToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Token failures. Expired and invalid tokens are distinct so clients can
    /// tell "log in again" from "this token was never valid".
    pub enum TokenError {
        Expired => "token has expired",
        Invalid => "token is invalid",
        Signing { message: String } => "token signing failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign a token whose subject is `user_id`.
    fn issue(&self, user_id: &UserId) -> Result<AccessToken, TokenError>;

    /// Check signature and expiry, returning the subject.
    fn validate(&self, token: &str) -> Result<UserId, TokenError>;
}
