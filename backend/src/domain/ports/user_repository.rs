//! Driven port for user account storage.
//!
//! Email and username uniqueness is enforced by the store itself; adapters
//! report a violated constraint as a dedicated error variant rather than a
//! generic query failure.

use async_trait::async_trait;

use crate::domain::{EmailAddress, PageRequest, User, UserAccount, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// The store could not be reached or did not answer in time.
        Connection { message: String } =>
            "user store connection failed: {message}",
        /// The store rejected or failed the operation.
        Query { message: String } =>
            "user store query failed: {message}",
        /// Another account already uses this email.
        DuplicateEmail => "email already registered",
        /// Another account already uses this username.
        DuplicateUsername => "username already taken",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    async fn insert(&self, account: &UserAccount) -> Result<(), UserRepositoryError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Account including the password hash, for credential checks.
    async fn find_account_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserRepositoryError>;

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserRepositoryError>;

    async fn username_exists(&self, username: &Username) -> Result<bool, UserRepositoryError>;

    /// Active users, newest first, windowed by `page`.
    async fn list_active(&self, page: PageRequest) -> Result<Vec<User>, UserRepositoryError>;

    /// Overwrite username, full name, profile and `updated_at` of an existing
    /// user. Returns `None` when the user does not exist.
    async fn update(&self, user: &User) -> Result<Option<User>, UserRepositoryError>;
}
