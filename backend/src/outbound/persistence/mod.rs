//! PostgreSQL adapters on Diesel.
//!
//! - Row structs (`models`) and table definitions (`schema`) never leave
//!   this module; repositories translate them into domain types.
//! - Connections come from a `bb8` pool via `diesel-async`. Each repository
//!   call is bounded by the pool's store timeout.
//! - Driver failures are mapped onto the port error enums; closed
//!   connections and timeouts become `Connection` errors.
//!
//! ```ignore
//! use backpacker_connect::outbound::persistence::{
//!     DbPool, DieselTravelIntentRepository, PoolConfig,
//! };
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/backpacker")).await?;
//! let intents = DieselTravelIntentRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_store_health;
mod diesel_travel_intent_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_store_health::DieselStoreHealth;
pub use diesel_travel_intent_repository::DieselTravelIntentRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
