//! Domain ports for the hexagonal boundary.
//!
//! Driving ports are called by inbound adapters; driven ports are
//! implemented by outbound adapters and mocked in service tests.

mod macros;
pub(crate) use macros::define_port_error;

mod access_token_verifier;
mod login_service;
mod password_hasher;
mod registration_service;
mod store_health;
mod token_service;
mod travel_intent_command;
mod travel_intent_query;
mod travel_intent_repository;
mod user_profile_command;
mod user_repository;
mod users_query;

pub use access_token_verifier::AccessTokenVerifier;
pub use login_service::LoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use registration_service::RegistrationService;
#[cfg(test)]
pub use store_health::MockStoreHealth;
pub use store_health::{StoreHealth, StoreHealthError};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{TokenError, TokenService};
pub use travel_intent_command::TravelIntentCommand;
pub use travel_intent_query::TravelIntentQuery;
#[cfg(test)]
pub use travel_intent_repository::MockTravelIntentRepository;
pub use travel_intent_repository::{
    InterestMutation, TravelIntentRepository, TravelIntentRepositoryError,
};
pub use user_profile_command::UserProfileCommand;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
pub use users_query::UsersQuery;
