//! Driving port for reading user records.

use async_trait::async_trait;

use crate::domain::{Error, PageRequest, User, UserId};

#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// The caller's own record. A subject that no longer exists or was
    /// deactivated is treated as an invalid token.
    async fn current_user(&self, subject: &UserId) -> Result<User, Error>;

    async fn get_user(&self, id: &UserId) -> Result<User, Error>;

    /// Active users, newest first.
    async fn list_users(&self, page: PageRequest) -> Result<Vec<User>, Error>;
}
