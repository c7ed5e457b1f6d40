//! Driving port for reading travel intents.

use async_trait::async_trait;

use crate::domain::{Error, PageRequest, TravelIntent, TravelIntentFilter, TravelIntentId};

#[async_trait]
pub trait TravelIntentQuery: Send + Sync {
    async fn get(&self, id: &TravelIntentId) -> Result<TravelIntent, Error>;

    /// Matching intents, newest first.
    async fn list(
        &self,
        filter: &TravelIntentFilter,
        page: PageRequest,
    ) -> Result<Vec<TravelIntent>, Error>;
}
