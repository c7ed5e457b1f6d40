//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed domain entities used by the HTTP and
//! persistence layers, and the services that enforce travel intent and
//! identity rules. Invariants live on the types; services only sequence
//! port calls.
//!
//! Public surface:
//! - Error / ErrorCode — API error payload and stable identifiers.
//! - TravelIntent and its value types — the matching aggregate.
//! - User, UserAccount and credential types — identity.
//! - TravelIntentService / IdentityService — driving port implementations.

pub mod auth;
pub mod error;
pub mod identity_service;
pub mod pagination;
pub mod ports;
pub mod trace_id;
pub mod travel_intent;
pub mod travel_intent_service;
pub mod user;

pub use self::auth::{
    AccessToken, CredentialValidationError, LoginCredentials, PASSWORD_MAX, PASSWORD_MIN,
    Password, PasswordHash, RegistrationRequest, UserAccount,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::identity_service::{IdentityError, IdentityService};
pub use self::pagination::{PageRequest, PageRequestError};
pub use self::trace_id::TraceId;
pub use self::travel_intent::{
    Activities, BudgetRange, Description, Destination, MaxTravelers, TravelIntent,
    TravelIntentDraft, TravelIntentFilter, TravelIntentId, TravelIntentPatch,
    TravelIntentSnapshot, TravelIntentValidationError, TripType, TripTypes,
};
pub use self::travel_intent_service::{TravelIntentError, TravelIntentService};
pub use self::user::{
    EmailAddress, ExperienceLevel, FullName, ProfilePatch, TravelStyle, User, UserId,
    UserProfile, UserUpdate, UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backpacker_connect::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
