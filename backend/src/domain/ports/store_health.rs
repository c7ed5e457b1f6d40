//! Driven port answering whether the backing store is reachable.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    pub enum StoreHealthError {
        Unreachable { message: String } => "store unreachable: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreHealth: Send + Sync {
    /// Round-trip a trivial request to the store.
    async fn ping(&self) -> Result<(), StoreHealthError>;
}
