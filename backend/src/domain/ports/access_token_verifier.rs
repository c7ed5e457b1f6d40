//! Driving port resolving a bearer token to its subject.
//!
//! Verification is CPU-only (signature and expiry), so the port is
//! synchronous and can be called from request extractors directly.

use crate::domain::{Error, UserId};

pub trait AccessTokenVerifier: Send + Sync {
    /// Subject of a valid token; unauthorized otherwise, with
    /// `details.code` telling expired from invalid.
    fn verify(&self, token: &str) -> Result<UserId, Error>;
}
