//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories on Diesel.
//! - **memory**: in-process repositories for development and tests.
//! - **security**: Argon2id password hashing and JWT bearer tokens.
//!
//! Adapters translate between domain types and their backing technology;
//! business rules stay in the domain services.

pub mod memory;
pub mod persistence;
pub mod security;
