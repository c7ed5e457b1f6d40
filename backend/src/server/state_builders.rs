//! Builders wiring repositories, credential adapters and services into
//! handler state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::warn;

use backpacker_connect::domain::ports::{StoreHealth, TravelIntentRepository, UserRepository};
use backpacker_connect::domain::{IdentityService, TravelIntentService};
use backpacker_connect::inbound::http::state::HttpState;
use backpacker_connect::outbound::memory::{
    InMemoryStoreHealth, InMemoryTravelIntentRepository, InMemoryUserRepository,
};
use backpacker_connect::outbound::persistence::{
    DieselStoreHealth, DieselTravelIntentRepository, DieselUserRepository,
};
use backpacker_connect::outbound::security::{Argon2PasswordHasher, JwtTokenService};

use super::ServerConfig;

/// Handler state plus the store check used by readiness.
pub(crate) struct BuiltState {
    pub(crate) http_state: HttpState,
    pub(crate) store_health: Arc<dyn StoreHealth>,
}

fn assemble<R, U>(
    travel_intents: Arc<R>,
    users: Arc<U>,
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> HttpState
where
    R: TravelIntentRepository + 'static,
    U: UserRepository + 'static,
{
    let tokens = JwtTokenService::new(&config.jwt_secret, config.token_ttl, Arc::clone(&clock));
    HttpState::from_services(
        TravelIntentService::new(travel_intents, Arc::clone(&clock)),
        IdentityService::new(
            users,
            Arc::new(Argon2PasswordHasher::new()),
            Arc::new(tokens),
            clock,
        ),
    )
}

/// Use PostgreSQL adapters when a pool is configured, otherwise in-memory
/// stores that lose their contents on restart.
pub(crate) fn build_state(config: &ServerConfig) -> BuiltState {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    match &config.db_pool {
        Some(pool) => BuiltState {
            http_state: assemble(
                Arc::new(DieselTravelIntentRepository::new(pool.clone())),
                Arc::new(DieselUserRepository::new(pool.clone())),
                config,
                clock,
            ),
            store_health: Arc::new(DieselStoreHealth::new(pool.clone())),
        },
        None => {
            warn!("no database configured; using in-memory stores");
            BuiltState {
                http_state: assemble(
                    Arc::new(InMemoryTravelIntentRepository::new()),
                    Arc::new(InMemoryUserRepository::new()),
                    config,
                    clock,
                ),
                store_health: Arc::new(InMemoryStoreHealth),
            }
        }
    }
}
