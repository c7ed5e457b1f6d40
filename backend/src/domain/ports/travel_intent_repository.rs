//! Driven port for travel intent storage.
//!
//! Interest changes are single atomic store operations with set semantics:
//! adapters must never read the set, modify it in the application, and
//! write it back. Field edits are conditional on ownership so a concurrent
//! ownership check cannot be bypassed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    PageRequest, TravelIntent, TravelIntentFilter, TravelIntentId, TravelIntentPatch,
    TravelIntentValidationError, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by travel intent repository adapters.
    pub enum TravelIntentRepositoryError {
        /// The store could not be reached or did not answer in time.
        Connection { message: String } =>
            "travel intent store connection failed: {message}",
        /// The store rejected or failed the operation.
        Query { message: String } =>
            "travel intent store query failed: {message}",
        /// The patch no longer validates against the stored intent.
        InvalidPatch { error: TravelIntentValidationError } =>
            "travel intent update rejected: {error}",
    }
}

/// Outcome of an atomic interest set operation on an existing intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterestMutation {
    /// The set changed; carries the intent after the change.
    Applied(TravelIntent),
    /// The operation was a no-op; carries the current intent.
    Unchanged(TravelIntent),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TravelIntentRepository: Send + Sync {
    /// Persist a newly created intent.
    async fn insert(&self, intent: &TravelIntent) -> Result<(), TravelIntentRepositoryError>;

    /// Fetch one intent by id.
    async fn find_by_id(
        &self,
        id: &TravelIntentId,
    ) -> Result<Option<TravelIntent>, TravelIntentRepositoryError>;

    /// Intents matching `filter`, newest first with ties broken by id
    /// descending, windowed by `page`.
    async fn list(
        &self,
        filter: &TravelIntentFilter,
        page: PageRequest,
    ) -> Result<Vec<TravelIntent>, TravelIntentRepositoryError>;

    /// Apply `patch` and set `updated_at = now` when `id` exists and is owned
    /// by `owner`. Returns `None` when no such owned intent exists.
    async fn update_owned(
        &self,
        id: &TravelIntentId,
        owner: &UserId,
        patch: &TravelIntentPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<TravelIntent>, TravelIntentRepositoryError>;

    /// Append `user` to the interested set unless already present or the
    /// owner. Returns `None` when the intent does not exist.
    async fn add_interest(
        &self,
        id: &TravelIntentId,
        user: &UserId,
    ) -> Result<Option<InterestMutation>, TravelIntentRepositoryError>;

    /// Remove `user` from the interested set if present. Returns `None` when
    /// the intent does not exist.
    async fn remove_interest(
        &self,
        id: &TravelIntentId,
        user: &UserId,
    ) -> Result<Option<InterestMutation>, TravelIntentRepositoryError>;
}
