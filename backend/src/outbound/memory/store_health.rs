//! Store health for the in-process adapters: always reachable.

use async_trait::async_trait;

use crate::domain::ports::{StoreHealth, StoreHealthError};

#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryStoreHealth;

#[async_trait]
impl StoreHealth for InMemoryStoreHealth {
    async fn ping(&self) -> Result<(), StoreHealthError> {
        Ok(())
    }
}
