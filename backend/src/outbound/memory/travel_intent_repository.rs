//! In-memory travel intent repository.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{InterestMutation, TravelIntentRepository, TravelIntentRepositoryError};
use crate::domain::{
    PageRequest, TravelIntent, TravelIntentFilter, TravelIntentId, TravelIntentPatch, UserId,
};

use super::POISONED;

/// Travel intents held in a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryTravelIntentRepository {
    intents: Mutex<HashMap<TravelIntentId, TravelIntent>>,
}

impl InMemoryTravelIntentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<TravelIntentId, TravelIntent>>, TravelIntentRepositoryError>
    {
        self.intents
            .lock()
            .map_err(|_| TravelIntentRepositoryError::query(POISONED))
    }

    fn mutate_interest(
        &self,
        id: &TravelIntentId,
        change: impl FnOnce(&mut TravelIntent) -> bool,
    ) -> Result<Option<InterestMutation>, TravelIntentRepositoryError> {
        let mut intents = self.lock()?;
        let Some(intent) = intents.get_mut(id) else {
            return Ok(None);
        };
        let outcome = if change(intent) {
            InterestMutation::Applied(intent.clone())
        } else {
            InterestMutation::Unchanged(intent.clone())
        };
        Ok(Some(outcome))
    }
}

#[async_trait]
impl TravelIntentRepository for InMemoryTravelIntentRepository {
    async fn insert(&self, intent: &TravelIntent) -> Result<(), TravelIntentRepositoryError> {
        let mut intents = self.lock()?;
        if intents.contains_key(&intent.id()) {
            return Err(TravelIntentRepositoryError::query(format!(
                "travel intent {} already exists",
                intent.id()
            )));
        }
        intents.insert(intent.id(), intent.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &TravelIntentId,
    ) -> Result<Option<TravelIntent>, TravelIntentRepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn list(
        &self,
        filter: &TravelIntentFilter,
        page: PageRequest,
    ) -> Result<Vec<TravelIntent>, TravelIntentRepositoryError> {
        let intents = self.lock()?;
        let mut matching: Vec<&TravelIntent> = intents
            .values()
            .filter(|intent| filter.matches(intent))
            .collect();
        matching.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(page.window(matching.into_iter().cloned()))
    }

    async fn update_owned(
        &self,
        id: &TravelIntentId,
        owner: &UserId,
        patch: &TravelIntentPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<TravelIntent>, TravelIntentRepositoryError> {
        let mut intents = self.lock()?;
        let Some(intent) = intents.get_mut(id) else {
            return Ok(None);
        };
        if !intent.is_owned_by(owner) {
            return Ok(None);
        }
        intent
            .apply_patch(patch.clone(), now)
            .map_err(TravelIntentRepositoryError::invalid_patch)?;
        Ok(Some(intent.clone()))
    }

    async fn add_interest(
        &self,
        id: &TravelIntentId,
        user: &UserId,
    ) -> Result<Option<InterestMutation>, TravelIntentRepositoryError> {
        self.mutate_interest(id, |intent| intent.add_interest(user))
    }

    async fn remove_interest(
        &self,
        id: &TravelIntentId,
        user: &UserId,
    ) -> Result<Option<InterestMutation>, TravelIntentRepositoryError> {
        self.mutate_interest(id, |intent| intent.remove_interest(user))
    }
}
