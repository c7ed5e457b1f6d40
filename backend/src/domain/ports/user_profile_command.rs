//! Driving port for editing a user's own record.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId, UserUpdate};

#[async_trait]
pub trait UserProfileCommand: Send + Sync {
    /// Update `target` on behalf of `requester`; forbidden unless they are
    /// the same user.
    async fn update_profile(
        &self,
        requester: &UserId,
        target: &UserId,
        update: UserUpdate,
    ) -> Result<User, Error>;
}
