//! In-process adapters for the repository ports.
//!
//! Used when no database URL is configured and by HTTP tests. Each
//! operation takes the store mutex once, so interest changes and
//! ownership-conditional updates are as atomic here as the single-statement
//! SQL used by the PostgreSQL adapters. Data is lost on restart.

mod store_health;
mod travel_intent_repository;
mod user_repository;

pub use store_health::InMemoryStoreHealth;
pub use travel_intent_repository::InMemoryTravelIntentRepository;
pub use user_repository::InMemoryUserRepository;

/// Message reported when a previous holder of a store mutex panicked.
const POISONED: &str = "in-memory store mutex poisoned";
