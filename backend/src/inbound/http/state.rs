//! Shared HTTP adapter state.
//!
//! Handlers receive this bundle via `web::Data` and depend only on domain
//! ports, so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccessTokenVerifier, LoginService, PasswordHasher, RegistrationService, TokenService,
    TravelIntentCommand, TravelIntentQuery, TravelIntentRepository, UserProfileCommand,
    UserRepository, UsersQuery,
};
use crate::domain::{IdentityService, TravelIntentService};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub travel_intents: Arc<dyn TravelIntentCommand>,
    pub travel_intents_query: Arc<dyn TravelIntentQuery>,
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub tokens: Arc<dyn AccessTokenVerifier>,
    pub users: Arc<dyn UsersQuery>,
    pub profiles: Arc<dyn UserProfileCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub travel_intents: Arc<dyn TravelIntentCommand>,
    pub travel_intents_query: Arc<dyn TravelIntentQuery>,
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub tokens: Arc<dyn AccessTokenVerifier>,
    pub users: Arc<dyn UsersQuery>,
    pub profiles: Arc<dyn UserProfileCommand>,
}

impl HttpState {
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            travel_intents,
            travel_intents_query,
            login,
            registration,
            tokens,
            users,
            profiles,
        } = ports;
        Self {
            travel_intents,
            travel_intents_query,
            login,
            registration,
            tokens,
            users,
            profiles,
        }
    }
}

impl HttpState {
    /// Expose both domain services through every handler port.
    pub fn from_services<R, U, H, T>(
        travel_intents: TravelIntentService<R>,
        identity: IdentityService<U, H, T>,
    ) -> Self
    where
        R: TravelIntentRepository + 'static,
        U: UserRepository + 'static,
        H: PasswordHasher + 'static,
        T: TokenService + 'static,
    {
        let travel_intents = Arc::new(travel_intents);
        let identity = Arc::new(identity);
        Self::new(HttpStatePorts {
            travel_intents: travel_intents.clone(),
            travel_intents_query: travel_intents,
            login: identity.clone(),
            registration: identity.clone(),
            tokens: identity.clone(),
            users: identity.clone(),
            profiles: identity,
        })
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
