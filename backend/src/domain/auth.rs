//! Credential primitives: passwords, stored hashes, login and registration
//! inputs, and issued access tokens.
//!
//! Secrets are held in [`Zeroizing`] buffers and redacted from `Debug`.

use std::fmt;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use super::user::{EmailAddress, FullName, User, UserValidationError, Username};

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN: usize = 8;
/// Maximum accepted password length; bounds hashing cost.
pub const PASSWORD_MAX: usize = 128;

/// Validation failures for credential inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialValidationError {
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("password must be between {min} and {max} characters")]
    PasswordLength { min: usize, max: usize },
    #[error(transparent)]
    User(#[from] UserValidationError),
}

impl CredentialValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail => "email",
            Self::EmptyPassword | Self::PasswordLength { .. } => "password",
            Self::User(inner) => inner.field(),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyEmail | Self::EmptyPassword => "missing_field",
            Self::PasswordLength { .. } => "invalid_length",
            Self::User(inner) => inner.code(),
        }
    }
}

/// Plain-text password accepted at registration.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Validate length bounds; whitespace is kept as typed.
    pub fn new(raw: &str) -> Result<Self, CredentialValidationError> {
        let length = raw.chars().count();
        if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&length) {
            return Err(CredentialValidationError::PasswordLength {
                min: PASSWORD_MIN,
                max: PASSWORD_MAX,
            });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Expose the secret for hashing.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Encoded one-way password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a hasher or loaded from storage.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded PHC string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Email and password presented at login.
///
/// The email is normalised but deliberately not validated: a malformed
/// address must fail the same way as an unknown one.
///
/// # Examples
/// ```
/// use backpacker_connect::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ana@Example.com ", "s3cret-pass").unwrap();
/// assert_eq!(creds.email(), "ana@example.com");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Build credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        let normalised = email.trim().to_lowercase();
        if normalised.is_empty() {
            return Err(CredentialValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalised,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the account lookup.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Password as typed.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub email: EmailAddress,
    pub username: Username,
    pub full_name: FullName,
    pub password: Password,
}

impl RegistrationRequest {
    /// Validate every field, reporting the first failure.
    pub fn try_from_parts(
        email: &str,
        username: &str,
        full_name: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        Ok(Self {
            email: EmailAddress::new(email)?,
            username: Username::new(username)?,
            full_name: FullName::new(full_name)?,
            password: Password::new(password)?,
        })
    }
}

/// Stored user together with its password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub user: User,
    pub password_hash: PasswordHash,
}

/// Signed bearer token returned after a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: Zeroizing<String>,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Wrap a signed token and its expiry instant.
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: Zeroizing::new(token.into()),
            expires_at,
        }
    }

    /// Compact serialised token.
    pub fn as_str(&self) -> &str {
        self.token.as_str()
    }

    /// Instant after which the token is rejected.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
