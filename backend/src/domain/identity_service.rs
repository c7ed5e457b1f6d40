//! Identity use-cases: sign-up, login, token verification and user records.
//!
//! Password hashing and verification are slow by construction, so both run
//! on the blocking pool with the caller's tracing span re-entered.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{Span, error, info, warn};

use crate::domain::ports::{
    AccessTokenVerifier, LoginService, PasswordHashError, PasswordHasher, RegistrationService,
    TokenError, TokenService, UserProfileCommand, UserRepository, UserRepositoryError, UsersQuery,
};
use crate::domain::{
    AccessToken, EmailAddress, Error, LoginCredentials, PageRequest, Password, PasswordHash,
    RegistrationRequest, User, UserAccount, UserId, UserProfile, UserUpdate, UserValidationError,
};

/// Argon2id hash with default cost that no password produces. Unknown
/// emails are verified against it so they take as long as a wrong password.
pub(crate) const MISSING_ACCOUNT_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$YmFja3BhY2tlci1zYWx0IQ$XzUz8HFIuaIDWORocpb0goqgqgjaSl8GdcifECaRYbM";

/// Failures of identity operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("username already taken")]
    DuplicateUsername,
    /// Unknown email, wrong password, inactive account or malformed email.
    /// Callers cannot tell these apart.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    NotFound,
    #[error("users may only modify their own record")]
    Forbidden,
    #[error(transparent)]
    Validation(#[from] UserValidationError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("user store unavailable: {message}")]
    StoreUnavailable { message: String },
    #[error("user store failure: {message}")]
    Store { message: String },
    #[error(transparent)]
    Hashing(#[from] PasswordHashError),
}

impl From<UserRepositoryError> for IdentityError {
    fn from(value: UserRepositoryError) -> Self {
        match value {
            UserRepositoryError::Connection { message } => Self::StoreUnavailable { message },
            UserRepositoryError::Query { message } => Self::Store { message },
            UserRepositoryError::DuplicateEmail => Self::DuplicateEmail,
            UserRepositoryError::DuplicateUsername => Self::DuplicateUsername,
        }
    }
}

impl From<IdentityError> for Error {
    fn from(value: IdentityError) -> Self {
        match value {
            IdentityError::DuplicateEmail => {
                Error::conflict(value.to_string()).with_details(json!({ "field": "email" }))
            }
            IdentityError::DuplicateUsername => {
                Error::conflict(value.to_string()).with_details(json!({ "field": "username" }))
            }
            IdentityError::InvalidCredentials => Error::unauthorized(value.to_string()),
            IdentityError::NotFound => Error::not_found(value.to_string()),
            IdentityError::Forbidden => Error::forbidden(value.to_string()),
            IdentityError::Validation(err) => Error::invalid_request(err.to_string())
                .with_details(json!({ "field": err.field(), "code": err.code() })),
            IdentityError::Token(TokenError::Expired) => Error::unauthorized("token has expired")
                .with_details(json!({ "code": "token_expired" })),
            IdentityError::Token(TokenError::Invalid) => Error::unauthorized("token is invalid")
                .with_details(json!({ "code": "token_invalid" })),
            IdentityError::Token(TokenError::Signing { message }) => {
                error!(%message, "token signing failed");
                Error::internal(format!("token signing failed: {message}"))
            }
            IdentityError::StoreUnavailable { message } => {
                error!(%message, "user store unavailable");
                Error::service_unavailable("user store unavailable, retry later")
            }
            IdentityError::Store { message } => {
                error!(%message, "user store failure");
                Error::internal(format!("user store failure: {message}"))
            }
            IdentityError::Hashing(err) => {
                error!(error = %err, "password hashing failed");
                Error::internal(err.to_string())
            }
        }
    }
}

/// Identity service over a user store, a password hasher and a token signer.
pub struct IdentityService<U, H, T> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<U, H, T> Clone for IdentityService<U, H, T> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            hasher: Arc::clone(&self.hasher),
            tokens: Arc::clone(&self.tokens),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<U, H, T> IdentityService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    T: TokenService,
{
    pub fn new(users: Arc<U>, hasher: Arc<H>, tokens: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }

    async fn hash_password(&self, password: Password) -> Result<PasswordHash, IdentityError> {
        let hasher = Arc::clone(&self.hasher);
        let span = Span::current();
        tokio::task::spawn_blocking(move || span.in_scope(|| hasher.hash(&password)))
            .await
            .map_err(|err| PasswordHashError::hashing(err.to_string()))?
            .map_err(IdentityError::from)
    }

    async fn verify_password(&self, candidate: String, hash: PasswordHash) -> bool {
        let hasher = Arc::clone(&self.hasher);
        let span = Span::current();
        let candidate = zeroize::Zeroizing::new(candidate);
        tokio::task::spawn_blocking(move || span.in_scope(|| hasher.verify(&candidate, &hash)))
            .await
            .unwrap_or_else(|err| {
                warn!(error = %err, "password verification task failed");
                false
            })
    }

    /// Create an active, unverified account with an empty profile.
    pub async fn register_user(&self, request: RegistrationRequest) -> Result<User, IdentityError> {
        let RegistrationRequest {
            email,
            username,
            full_name,
            password,
        } = request;

        if self.users.email_exists(&email).await? {
            return Err(IdentityError::DuplicateEmail);
        }
        if self.users.username_exists(&username).await? {
            return Err(IdentityError::DuplicateUsername);
        }

        let password_hash = self.hash_password(password).await?;
        let now = self.clock.utc();
        let user = User {
            id: UserId::random(),
            email,
            username,
            full_name,
            profile: UserProfile::default(),
            is_verified: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        // The pre-checks race with concurrent sign-ups; the store's unique
        // constraints decide, surfacing as the same duplicate errors.
        self.users
            .insert(&UserAccount {
                user: user.clone(),
                password_hash,
            })
            .await?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Check credentials and return the matching active user.
    pub async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, IdentityError> {
        let Ok(email) = EmailAddress::new(credentials.email()) else {
            return Err(IdentityError::InvalidCredentials);
        };
        let Some(account) = self.users.find_account_by_email(&email).await? else {
            self.verify_password(
                credentials.password().to_owned(),
                PasswordHash::new(MISSING_ACCOUNT_HASH),
            )
            .await;
            return Err(IdentityError::InvalidCredentials);
        };

        let matches = self
            .verify_password(credentials.password().to_owned(), account.password_hash)
            .await;
        if !matches || !account.user.is_active {
            return Err(IdentityError::InvalidCredentials);
        }
        Ok(account.user)
    }

    pub async fn issue_token(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AccessToken, IdentityError> {
        let user = self.authenticate(credentials).await?;
        let token = self.tokens.issue(&user.id)?;
        info!(user_id = %user.id, "access token issued");
        Ok(token)
    }

    pub fn validate_token(&self, token: &str) -> Result<UserId, IdentityError> {
        Ok(self.tokens.validate(token)?)
    }

    /// Resolve a token subject, rejecting subjects that vanished or were
    /// deactivated after the token was issued.
    pub async fn resolve_subject(&self, subject: &UserId) -> Result<User, IdentityError> {
        match self.users.find_by_id(subject).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(IdentityError::Token(TokenError::Invalid)),
        }
    }

    pub async fn find_user(&self, id: &UserId) -> Result<User, IdentityError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(IdentityError::NotFound)
    }

    pub async fn list_active_users(&self, page: PageRequest) -> Result<Vec<User>, IdentityError> {
        Ok(self.users.list_active(page).await?)
    }

    /// Apply `update` to the requester's own record.
    pub async fn update_user(
        &self,
        requester: &UserId,
        target: &UserId,
        update: UserUpdate,
    ) -> Result<User, IdentityError> {
        if requester != target {
            return Err(IdentityError::Forbidden);
        }
        let mut user = self.find_user(target).await?;

        if let Some(username) = update.username.as_ref() {
            if username != &user.username && self.users.username_exists(username).await? {
                return Err(IdentityError::DuplicateUsername);
            }
        }

        user.apply_update(update, self.clock.utc())?;
        self.users
            .update(&user)
            .await?
            .ok_or(IdentityError::NotFound)
    }
}

#[async_trait]
impl<U, H, T> RegistrationService for IdentityService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    T: TokenService,
{
    async fn register(&self, request: RegistrationRequest) -> Result<User, Error> {
        Ok(self.register_user(request).await?)
    }
}

#[async_trait]
impl<U, H, T> LoginService for IdentityService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    T: TokenService,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error> {
        Ok(self.issue_token(credentials).await?)
    }
}

impl<U, H, T> AccessTokenVerifier for IdentityService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    T: TokenService,
{
    fn verify(&self, token: &str) -> Result<UserId, Error> {
        Ok(self.validate_token(token)?)
    }
}

#[async_trait]
impl<U, H, T> UsersQuery for IdentityService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    T: TokenService,
{
    async fn current_user(&self, subject: &UserId) -> Result<User, Error> {
        Ok(self.resolve_subject(subject).await?)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, Error> {
        Ok(self.find_user(id).await?)
    }

    async fn list_users(&self, page: PageRequest) -> Result<Vec<User>, Error> {
        Ok(self.list_active_users(page).await?)
    }
}

#[async_trait]
impl<U, H, T> UserProfileCommand for IdentityService<U, H, T>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    T: TokenService,
{
    async fn update_profile(
        &self,
        requester: &UserId,
        target: &UserId,
        update: UserUpdate,
    ) -> Result<User, Error> {
        Ok(self.update_user(requester, target, update).await?)
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
