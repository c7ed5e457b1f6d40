//! User identity and profile model.
//!
//! Every string a user controls is wrapped in a validated newtype so that a
//! [`User`] value can only hold well-formed data. Password material never
//! appears here; see [`crate::domain::UserAccount`].

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum stored email length.
pub const EMAIL_MAX: usize = 254;
/// Minimum username length.
pub const USERNAME_MIN: usize = 3;
/// Maximum username length.
pub const USERNAME_MAX: usize = 50;
/// Minimum full name length.
pub const FULL_NAME_MIN: usize = 2;
/// Maximum full name length.
pub const FULL_NAME_MAX: usize = 100;
/// Maximum biography length.
pub const BIO_MAX: usize = 500;

/// Validation failures for user-supplied identity and profile data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("email must be a valid address of at most {max} characters")]
    InvalidEmail { max: usize },
    #[error("username must be between {min} and {max} characters")]
    UsernameLength { min: usize, max: usize },
    #[error("username may only contain letters, digits, '_', '-' or '.'")]
    UsernameCharacters,
    #[error("full name must be between {min} and {max} characters")]
    FullNameLength { min: usize, max: usize },
    #[error("bio must be at most {max} characters")]
    BioTooLong { max: usize },
}

impl UserValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::InvalidEmail { .. } => "email",
            Self::UsernameLength { .. } | Self::UsernameCharacters => "username",
            Self::FullNameLength { .. } => "fullName",
            Self::BioTooLong { .. } => "bio",
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_uuid",
            Self::InvalidEmail { .. } => "invalid_email",
            Self::UsernameLength { .. } | Self::FullNameLength { .. } | Self::BioTooLong { .. } => {
                "invalid_length"
            }
            Self::UsernameCharacters => "invalid_characters",
        }
    }
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self::from_uuid)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.1
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.1)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.1
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.\-]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

/// Lower-cased email address; the login identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, format = Email)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Trim, lower-case and validate an address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.chars().count() > EMAIL_MAX || !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail { max: EMAIL_MAX });
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Public handle; unique across users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "wanderlust_ana")]
pub struct Username(String);

impl Username {
    /// Validate a username. Case is preserved.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = raw.into();
        let length = value.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
            return Err(UserValidationError::UsernameLength {
                min: USERNAME_MIN,
                max: USERNAME_MAX,
            });
        }
        if !username_regex().is_match(&value) {
            return Err(UserValidationError::UsernameCharacters);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Display name shown on profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Ana Souza")]
pub struct FullName(String);

impl FullName {
    /// Trim and validate a full name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        let length = trimmed.chars().count();
        if !(FULL_NAME_MIN..=FULL_NAME_MAX).contains(&length) {
            return Err(UserValidationError::FullNameLength {
                min: FULL_NAME_MIN,
                max: FULL_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<FullName> for String {
    fn from(value: FullName) -> Self {
        value.0
    }
}

impl TryFrom<String> for FullName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// How a traveller likes to spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TravelStyle {
    Budget,
    Midrange,
    Luxury,
}

/// Self-reported travel experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Experienced,
}

/// Optional profile attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub interests: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_style: Option<TravelStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<ExperienceLevel>,
    pub languages: Vec<String>,
}

/// Field-wise profile change. `None` leaves a field untouched; for nullable
/// fields `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub bio: Option<Option<String>>,
    pub profile_picture: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub interests: Option<Vec<String>>,
    pub travel_style: Option<Option<TravelStyle>>,
    pub experience_level: Option<Option<ExperienceLevel>>,
    pub languages: Option<Vec<String>>,
}

impl UserProfile {
    /// Produce a new profile with `patch` applied on top of `self`.
    pub fn merged(&self, patch: ProfilePatch) -> Result<Self, UserValidationError> {
        let ProfilePatch {
            bio,
            profile_picture,
            location,
            interests,
            travel_style,
            experience_level,
            languages,
        } = patch;

        if let Some(Some(text)) = &bio {
            if text.chars().count() > BIO_MAX {
                return Err(UserValidationError::BioTooLong { max: BIO_MAX });
            }
        }

        let current = self.clone();
        Ok(Self {
            bio: bio.unwrap_or(current.bio),
            profile_picture: profile_picture.unwrap_or(current.profile_picture),
            location: location.unwrap_or(current.location),
            interests: interests.unwrap_or(current.interests),
            travel_style: travel_style.unwrap_or(current.travel_style),
            experience_level: experience_level.unwrap_or(current.experience_level),
            languages: languages.unwrap_or(current.languages),
        })
    }
}

/// Registered user as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = String, format = Uuid)]
    pub id: UserId,
    pub email: EmailAddress,
    pub username: Username,
    pub full_name: FullName,
    pub profile: UserProfile,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Requested changes to a user's own record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub username: Option<Username>,
    pub full_name: Option<FullName>,
    pub profile: Option<ProfilePatch>,
}

impl UserUpdate {
    /// True when nothing would change.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.full_name.is_none() && self.profile.is_none()
    }
}

impl User {
    /// Apply `update`, stamping `updated_at` with `now`.
    pub fn apply_update(
        &mut self,
        update: UserUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), UserValidationError> {
        let UserUpdate {
            username,
            full_name,
            profile,
        } = update;
        if let Some(patch) = profile {
            self.profile = self.profile.merged(patch)?;
        }
        if let Some(value) = username {
            self.username = value;
        }
        if let Some(value) = full_name {
            self.full_name = value;
        }
        self.updated_at = now;
        Ok(())
    }
}
