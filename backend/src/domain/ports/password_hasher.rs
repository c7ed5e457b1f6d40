//! Driven port for one-way password hashing.
//!
//! Hashing is CPU-bound and deliberately slow, so the port is synchronous;
//! async callers move the work onto a blocking thread.

use crate::domain::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Errors raised while hashing.
    pub enum PasswordHashError {
        /// The hashing backend rejected the input or its parameters.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Salt and hash `password`.
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError>;

    /// Compare `candidate` against `hash` in constant time. Malformed hashes
    /// and mismatches both yield `false`.
    fn verify(&self, candidate: &str, hash: &PasswordHash) -> bool;
}
