//! Travel intent use-cases.
//!
//! The service enforces ownership and interest rules and delegates every
//! mutation to a single atomic repository call. It holds no locks; two
//! concurrent requests only ever race inside the store.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{error, info};

use crate::domain::ports::{
    InterestMutation, TravelIntentCommand, TravelIntentQuery, TravelIntentRepository,
    TravelIntentRepositoryError,
};
use crate::domain::{
    Error, PageRequest, TravelIntent, TravelIntentDraft, TravelIntentFilter, TravelIntentId,
    TravelIntentPatch, TravelIntentValidationError, UserId,
};

/// Business-rule and infrastructure failures of travel intent operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TravelIntentError {
    #[error("travel intent {id} not found")]
    NotFound { id: TravelIntentId },
    #[error("only the owner may modify this travel intent")]
    Forbidden,
    #[error("cannot express interest in your own travel intent")]
    SelfInterestForbidden,
    #[error("already expressed interest in this travel intent")]
    AlreadyInterested,
    #[error("interest was not previously expressed for this travel intent")]
    NotInterested,
    #[error(transparent)]
    Validation(#[from] TravelIntentValidationError),
    #[error("travel intent store unavailable: {message}")]
    StoreUnavailable { message: String },
    #[error("travel intent store failure: {message}")]
    Store { message: String },
}

impl From<TravelIntentRepositoryError> for TravelIntentError {
    fn from(value: TravelIntentRepositoryError) -> Self {
        match value {
            TravelIntentRepositoryError::Connection { message } => {
                Self::StoreUnavailable { message }
            }
            TravelIntentRepositoryError::Query { message } => Self::Store { message },
            TravelIntentRepositoryError::InvalidPatch { error } => Self::Validation(error),
        }
    }
}

impl From<TravelIntentError> for Error {
    fn from(value: TravelIntentError) -> Self {
        match value {
            TravelIntentError::NotFound { id } => Error::not_found("travel intent not found")
                .with_details(json!({ "id": id.to_string() })),
            TravelIntentError::Forbidden => Error::forbidden(value.to_string()),
            TravelIntentError::SelfInterestForbidden => Error::invalid_request(value.to_string())
                .with_details(json!({ "code": "self_interest" })),
            TravelIntentError::AlreadyInterested => Error::invalid_request(value.to_string())
                .with_details(json!({ "code": "already_interested" })),
            TravelIntentError::NotInterested => Error::invalid_request(value.to_string())
                .with_details(json!({ "code": "not_interested" })),
            TravelIntentError::Validation(err) => Error::invalid_request(err.to_string())
                .with_details(json!({ "field": err.field(), "code": err.code() })),
            TravelIntentError::StoreUnavailable { message } => {
                error!(%message, "travel intent store unavailable");
                Error::service_unavailable("travel intent store unavailable, retry later")
            }
            TravelIntentError::Store { message } => {
                error!(%message, "travel intent store failure");
                Error::internal(format!("travel intent store failure: {message}"))
            }
        }
    }
}

/// Travel intent service backed by a [`TravelIntentRepository`].
#[derive(Clone)]
pub struct TravelIntentService<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> TravelIntentService<R>
where
    R: TravelIntentRepository,
{
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Open a new intent owned by `owner`.
    pub async fn create_intent(
        &self,
        owner: &UserId,
        draft: TravelIntentDraft,
    ) -> Result<TravelIntent, TravelIntentError> {
        let intent = TravelIntent::create(
            TravelIntentId::random(),
            owner.clone(),
            draft,
            self.clock.utc(),
        )?;
        self.repository.insert(&intent).await?;
        info!(intent_id = %intent.id(), owner = %owner, "travel intent created");
        Ok(intent)
    }

    pub async fn find_intent(&self, id: &TravelIntentId) -> Result<TravelIntent, TravelIntentError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(TravelIntentError::NotFound { id: *id })
    }

    pub async fn list_intents(
        &self,
        filter: &TravelIntentFilter,
        page: PageRequest,
    ) -> Result<Vec<TravelIntent>, TravelIntentError> {
        Ok(self.repository.list(filter, page).await?)
    }

    /// Apply an owner's partial update.
    ///
    /// The merged dates are validated before anything is written; the write
    /// itself is conditional on ownership.
    pub async fn update_intent(
        &self,
        id: &TravelIntentId,
        requester: &UserId,
        patch: TravelIntentPatch,
    ) -> Result<TravelIntent, TravelIntentError> {
        let current = self.find_intent(id).await?;
        if !current.is_owned_by(requester) {
            return Err(TravelIntentError::Forbidden);
        }

        let now = self.clock.utc();
        let mut preview = current;
        preview.apply_patch(patch.clone(), now)?;

        self.repository
            .update_owned(id, requester, &patch, now)
            .await?
            .ok_or(TravelIntentError::NotFound { id: *id })
    }

    pub async fn deactivate_intent(
        &self,
        id: &TravelIntentId,
        requester: &UserId,
    ) -> Result<(), TravelIntentError> {
        self.update_intent(id, requester, TravelIntentPatch::deactivation())
            .await?;
        info!(intent_id = %id, "travel intent deactivated");
        Ok(())
    }

    /// Add `user` to the interested set in one atomic store operation.
    ///
    /// A no-op outcome is disambiguated afterwards: the owner is never
    /// admitted, anyone else was already present.
    pub async fn add_interest(
        &self,
        id: &TravelIntentId,
        user: &UserId,
    ) -> Result<TravelIntent, TravelIntentError> {
        match self.repository.add_interest(id, user).await? {
            None => Err(TravelIntentError::NotFound { id: *id }),
            Some(InterestMutation::Applied(intent)) => Ok(intent),
            Some(InterestMutation::Unchanged(intent)) if intent.is_owned_by(user) => {
                Err(TravelIntentError::SelfInterestForbidden)
            }
            Some(InterestMutation::Unchanged(_)) => Err(TravelIntentError::AlreadyInterested),
        }
    }

    /// Remove `user` from the interested set in one atomic store operation.
    pub async fn drop_interest(
        &self,
        id: &TravelIntentId,
        user: &UserId,
    ) -> Result<TravelIntent, TravelIntentError> {
        match self.repository.remove_interest(id, user).await? {
            None => Err(TravelIntentError::NotFound { id: *id }),
            Some(InterestMutation::Applied(intent)) => Ok(intent),
            Some(InterestMutation::Unchanged(_)) => Err(TravelIntentError::NotInterested),
        }
    }
}

#[async_trait]
impl<R> TravelIntentCommand for TravelIntentService<R>
where
    R: TravelIntentRepository,
{
    async fn create(&self, owner: &UserId, draft: TravelIntentDraft) -> Result<TravelIntent, Error> {
        Ok(self.create_intent(owner, draft).await?)
    }

    async fn update(
        &self,
        id: &TravelIntentId,
        requester: &UserId,
        patch: TravelIntentPatch,
    ) -> Result<TravelIntent, Error> {
        Ok(self.update_intent(id, requester, patch).await?)
    }

    async fn deactivate(&self, id: &TravelIntentId, requester: &UserId) -> Result<(), Error> {
        Ok(self.deactivate_intent(id, requester).await?)
    }

    async fn express_interest(
        &self,
        id: &TravelIntentId,
        user: &UserId,
    ) -> Result<TravelIntent, Error> {
        Ok(self.add_interest(id, user).await?)
    }

    async fn remove_interest(&self, id: &TravelIntentId, user: &UserId) -> Result<TravelIntent, Error> {
        Ok(self.drop_interest(id, user).await?)
    }
}

#[async_trait]
impl<R> TravelIntentQuery for TravelIntentService<R>
where
    R: TravelIntentRepository,
{
    async fn get(&self, id: &TravelIntentId) -> Result<TravelIntent, Error> {
        Ok(self.find_intent(id).await?)
    }

    async fn list(
        &self,
        filter: &TravelIntentFilter,
        page: PageRequest,
    ) -> Result<Vec<TravelIntent>, Error> {
        Ok(self.list_intents(filter, page).await?)
    }
}

#[cfg(test)]
#[path = "travel_intent_service_tests.rs"]
mod tests;
