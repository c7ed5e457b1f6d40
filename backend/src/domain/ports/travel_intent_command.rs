//! Driving port for travel intent mutations.
//!
//! Inbound adapters call this port with already-validated domain inputs and
//! the authenticated user; ownership and interest rules live behind it.

use async_trait::async_trait;

use crate::domain::{Error, TravelIntent, TravelIntentDraft, TravelIntentId, TravelIntentPatch, UserId};

#[async_trait]
pub trait TravelIntentCommand: Send + Sync {
    /// Open a new intent owned by `owner`.
    async fn create(&self, owner: &UserId, draft: TravelIntentDraft)
    -> Result<TravelIntent, Error>;

    /// Apply an owner's partial update.
    async fn update(
        &self,
        id: &TravelIntentId,
        requester: &UserId,
        patch: TravelIntentPatch,
    ) -> Result<TravelIntent, Error>;

    /// Soft-delete an intent on behalf of its owner.
    async fn deactivate(&self, id: &TravelIntentId, requester: &UserId) -> Result<(), Error>;

    /// Join the interested-users set.
    async fn express_interest(
        &self,
        id: &TravelIntentId,
        user: &UserId,
    ) -> Result<TravelIntent, Error>;

    /// Leave the interested-users set.
    async fn remove_interest(&self, id: &TravelIntentId, user: &UserId)
    -> Result<TravelIntent, Error>;
}
