//! Travel intents: a user's declared trip, open to companions.
//!
//! A [`TravelIntent`] is owned by the user who created it. Only the owner
//! edits its fields; any other user may join or leave its interested-users
//! set. The set preserves insertion order, never holds duplicates, and never
//! holds the owner.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserId;

pub const DESTINATION_MIN: usize = 2;
pub const DESTINATION_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 1000;
pub const BUDGET_RANGE_MAX: usize = 100;
pub const ACTIVITY_MAX: usize = 50;
pub const ACTIVITIES_MAX: usize = 20;
pub const MAX_TRAVELERS_LIMIT: u16 = 50;

/// Field-level validation failures for travel intent input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TravelIntentValidationError {
    #[error("travel intent id must be a valid UUID")]
    InvalidId,
    #[error("destination must be between {min} and {max} characters")]
    DestinationLength { min: usize, max: usize },
    #[error("description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
    #[error("budget range must be at most {max} characters")]
    BudgetRangeTooLong { max: usize },
    #[error("max travelers must be between {min} and {max}")]
    MaxTravelersOutOfRange { min: u16, max: u16 },
    #[error("activities must be non-empty and at most {max} characters each")]
    InvalidActivity { max: usize },
    #[error("at most {max} activities may be listed")]
    TooManyActivities { max: usize },
    #[error("end date must not be before start date")]
    EndBeforeStart,
}

impl TravelIntentValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::DestinationLength { .. } => "destination",
            Self::DescriptionTooLong { .. } => "description",
            Self::BudgetRangeTooLong { .. } => "budgetRange",
            Self::MaxTravelersOutOfRange { .. } => "maxTravelers",
            Self::InvalidActivity { .. } | Self::TooManyActivities { .. } => "activities",
            Self::EndBeforeStart => "endDate",
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId => "invalid_uuid",
            Self::DestinationLength { .. }
            | Self::DescriptionTooLong { .. }
            | Self::BudgetRangeTooLong { .. }
            | Self::InvalidActivity { .. }
            | Self::TooManyActivities { .. } => "invalid_length",
            Self::MaxTravelersOutOfRange { .. } => "out_of_range",
            Self::EndBeforeStart => "end_before_start",
        }
    }
}

/// Travel intent identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TravelIntentId(Uuid);

impl TravelIntentId {
    /// Parse an identifier, rejecting anything but a canonical UUID.
    pub fn new(raw: &str) -> Result<Self, TravelIntentValidationError> {
        if raw.trim() != raw {
            return Err(TravelIntentValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| TravelIntentValidationError::InvalidId)
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TravelIntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn bounded_text<E>(raw: &str, min: usize, max: usize, err: E) -> Result<String, E> {
    let trimmed = raw.trim();
    let length = trimmed.chars().count();
    if (min..=max).contains(&length) {
        Ok(trimmed.to_owned())
    } else {
        Err(err)
    }
}

/// Where the trip goes; trimmed, 2 to 100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination(String);

impl Destination {
    pub fn new(raw: &str) -> Result<Self, TravelIntentValidationError> {
        bounded_text(
            raw,
            DESTINATION_MIN,
            DESTINATION_MAX,
            TravelIntentValidationError::DestinationLength {
                min: DESTINATION_MIN,
                max: DESTINATION_MAX,
            },
        )
        .map(Self)
    }
}

impl AsRef<str> for Destination {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Free-text trip description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description(String);

impl Description {
    pub fn new(raw: &str) -> Result<Self, TravelIntentValidationError> {
        bounded_text(
            raw,
            0,
            DESCRIPTION_MAX,
            TravelIntentValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX,
            },
        )
        .map(Self)
    }
}

impl AsRef<str> for Description {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Free-text budget hint such as "1000-1500 EUR".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetRange(String);

impl BudgetRange {
    pub fn new(raw: &str) -> Result<Self, TravelIntentValidationError> {
        bounded_text(
            raw,
            0,
            BUDGET_RANGE_MAX,
            TravelIntentValidationError::BudgetRangeTooLong {
                max: BUDGET_RANGE_MAX,
            },
        )
        .map(Self)
    }
}

impl AsRef<str> for BudgetRange {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Group size cap including the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxTravelers(u16);

impl MaxTravelers {
    pub fn new(value: i64) -> Result<Self, TravelIntentValidationError> {
        let out_of_range = TravelIntentValidationError::MaxTravelersOutOfRange {
            min: 1,
            max: MAX_TRAVELERS_LIMIT,
        };
        match u16::try_from(value) {
            Ok(count) if (1..=MAX_TRAVELERS_LIMIT).contains(&count) => Ok(Self(count)),
            _ => Err(out_of_range),
        }
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

/// Activity tags; each trimmed and non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activities(Vec<String>);

impl Activities {
    pub fn new(raw: Vec<String>) -> Result<Self, TravelIntentValidationError> {
        if raw.len() > ACTIVITIES_MAX {
            return Err(TravelIntentValidationError::TooManyActivities {
                max: ACTIVITIES_MAX,
            });
        }
        raw.iter()
            .map(|activity| {
                bounded_text(
                    activity,
                    1,
                    ACTIVITY_MAX,
                    TravelIntentValidationError::InvalidActivity { max: ACTIVITY_MAX },
                )
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Kind of trip being planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    Adventure,
    Cultural,
    Relaxation,
    Sightseeing,
    FoodTour,
    Nature,
    Beach,
    City,
    Other,
}

impl TripType {
    /// Storage and wire spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Adventure => "adventure",
            Self::Cultural => "cultural",
            Self::Relaxation => "relaxation",
            Self::Sightseeing => "sightseeing",
            Self::FoodTour => "food_tour",
            Self::Nature => "nature",
            Self::Beach => "beach",
            Self::City => "city",
            Self::Other => "other",
        }
    }

    /// Inverse of [`TripType::as_str`].
    pub fn parse(raw: &str) -> Option<Self> {
        [
            Self::Adventure,
            Self::Cultural,
            Self::Relaxation,
            Self::Sightseeing,
            Self::FoodTour,
            Self::Nature,
            Self::Beach,
            Self::City,
            Self::Other,
        ]
        .into_iter()
        .find(|candidate| candidate.as_str() == raw)
    }
}

/// Non-empty, duplicate-free set of trip types in first-seen order.
///
/// An empty input yields the default set `[adventure]`.
///
/// # Examples
/// ```
/// use backpacker_connect::domain::{TripType, TripTypes};
///
/// let types = TripTypes::new(vec![TripType::Beach, TripType::Beach, TripType::City]);
/// assert_eq!(types.as_slice(), &[TripType::Beach, TripType::City]);
/// assert_eq!(TripTypes::new(vec![]).as_slice(), &[TripType::Adventure]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripTypes(Vec<TripType>);

impl TripTypes {
    pub fn new(raw: Vec<TripType>) -> Self {
        let mut unique = Vec::with_capacity(raw.len());
        for trip_type in raw {
            if !unique.contains(&trip_type) {
                unique.push(trip_type);
            }
        }
        if unique.is_empty() {
            return Self::default();
        }
        Self(unique)
    }

    pub fn as_slice(&self) -> &[TripType] {
        &self.0
    }
}

impl Default for TripTypes {
    fn default() -> Self {
        Self(vec![TripType::Adventure])
    }
}

/// Validated input for creating a travel intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelIntentDraft {
    pub destination: Destination,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub flexible_dates: bool,
    pub description: Option<Description>,
    pub trip_types: TripTypes,
    pub max_travelers: Option<MaxTravelers>,
    pub budget_range: Option<BudgetRange>,
    pub activities: Activities,
}

/// Partial update. Outer `None` leaves a field as is; `Some(None)` clears a
/// nullable field. Trip types, when present, replace the whole set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TravelIntentPatch {
    pub destination: Option<Destination>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub flexible_dates: Option<bool>,
    pub description: Option<Option<Description>>,
    pub trip_types: Option<TripTypes>,
    pub max_travelers: Option<Option<MaxTravelers>>,
    pub budget_range: Option<Option<BudgetRange>>,
    pub activities: Option<Activities>,
    pub is_active: Option<bool>,
}

impl TravelIntentPatch {
    /// Patch that only flips the active flag off.
    pub fn deactivation() -> Self {
        Self {
            is_active: Some(false),
            ..Self::default()
        }
    }
}

fn check_dates(
    start: NaiveDate,
    end: Option<NaiveDate>,
) -> Result<(), TravelIntentValidationError> {
    match end {
        Some(end) if end < start => Err(TravelIntentValidationError::EndBeforeStart),
        _ => Ok(()),
    }
}

/// Every stored attribute of a travel intent, used by adapters to rebuild
/// the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelIntentSnapshot {
    pub id: TravelIntentId,
    pub owner_id: UserId,
    pub destination: Destination,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub flexible_dates: bool,
    pub description: Option<Description>,
    pub trip_types: TripTypes,
    pub max_travelers: Option<MaxTravelers>,
    pub budget_range: Option<BudgetRange>,
    pub activities: Activities,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
    pub interested_users: Vec<UserId>,
    pub group_id: Option<Uuid>,
}

/// Travel intent aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelIntent {
    inner: TravelIntentSnapshot,
}

impl TravelIntent {
    /// Open a new intent: active, nobody interested, no group.
    pub fn create(
        id: TravelIntentId,
        owner_id: UserId,
        draft: TravelIntentDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, TravelIntentValidationError> {
        check_dates(draft.start_date, draft.end_date)?;
        let TravelIntentDraft {
            destination,
            start_date,
            end_date,
            flexible_dates,
            description,
            trip_types,
            max_travelers,
            budget_range,
            activities,
        } = draft;
        Ok(Self {
            inner: TravelIntentSnapshot {
                id,
                owner_id,
                destination,
                start_date,
                end_date,
                flexible_dates,
                description,
                trip_types,
                max_travelers,
                budget_range,
                activities,
                created_at: now,
                updated_at: now,
                is_active: true,
                interested_users: Vec::new(),
                group_id: None,
            },
        })
    }

    /// Rebuild from stored state.
    ///
    /// Duplicate and owner entries in `interested_users` are dropped so the
    /// set invariants hold whatever the store returned.
    pub fn restore(mut snapshot: TravelIntentSnapshot) -> Self {
        let mut seen = Vec::with_capacity(snapshot.interested_users.len());
        for user in snapshot.interested_users.drain(..) {
            if user != snapshot.owner_id && !seen.contains(&user) {
                seen.push(user);
            }
        }
        snapshot.interested_users = seen;
        Self { inner: snapshot }
    }

    pub fn id(&self) -> TravelIntentId {
        self.inner.id
    }

    pub fn owner_id(&self) -> &UserId {
        &self.inner.owner_id
    }

    pub fn destination(&self) -> &Destination {
        &self.inner.destination
    }

    pub fn start_date(&self) -> NaiveDate {
        self.inner.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.inner.end_date
    }

    pub fn flexible_dates(&self) -> bool {
        self.inner.flexible_dates
    }

    pub fn description(&self) -> Option<&Description> {
        self.inner.description.as_ref()
    }

    pub fn trip_types(&self) -> &TripTypes {
        &self.inner.trip_types
    }

    pub fn max_travelers(&self) -> Option<MaxTravelers> {
        self.inner.max_travelers
    }

    pub fn budget_range(&self) -> Option<&BudgetRange> {
        self.inner.budget_range.as_ref()
    }

    pub fn activities(&self) -> &Activities {
        &self.inner.activities
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.inner.updated_at
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_active
    }

    /// Interested users in the order they joined.
    pub fn interested_users(&self) -> &[UserId] {
        &self.inner.interested_users
    }

    pub fn group_id(&self) -> Option<Uuid> {
        self.inner.group_id
    }

    /// Always equal to `interested_users().len()`.
    pub fn interested_users_count(&self) -> usize {
        self.inner.interested_users.len()
    }

    /// True once a group has been formed from this intent.
    pub fn has_group(&self) -> bool {
        self.inner.group_id.is_some()
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.inner.owner_id == user
    }

    pub fn is_interested(&self, user: &UserId) -> bool {
        self.inner.interested_users.contains(user)
    }

    /// Apply `patch` and re-stamp `updated_at`. Dates are checked against
    /// the merged result; on failure nothing changes.
    pub fn apply_patch(
        &mut self,
        patch: TravelIntentPatch,
        now: DateTime<Utc>,
    ) -> Result<(), TravelIntentValidationError> {
        let start = patch.start_date.unwrap_or(self.inner.start_date);
        let end = patch.end_date.unwrap_or(self.inner.end_date);
        check_dates(start, end)?;

        let TravelIntentPatch {
            destination,
            start_date: _,
            end_date: _,
            flexible_dates,
            description,
            trip_types,
            max_travelers,
            budget_range,
            activities,
            is_active,
        } = patch;
        let state = &mut self.inner;
        state.start_date = start;
        state.end_date = end;
        if let Some(value) = destination {
            state.destination = value;
        }
        if let Some(value) = flexible_dates {
            state.flexible_dates = value;
        }
        if let Some(value) = description {
            state.description = value;
        }
        if let Some(value) = trip_types {
            state.trip_types = value;
        }
        if let Some(value) = max_travelers {
            state.max_travelers = value;
        }
        if let Some(value) = budget_range {
            state.budget_range = value;
        }
        if let Some(value) = activities {
            state.activities = value;
        }
        if let Some(value) = is_active {
            state.is_active = value;
        }
        state.updated_at = now;
        Ok(())
    }

    /// Append `user` unless it is the owner or already present.
    /// Returns whether the set changed.
    pub fn add_interest(&mut self, user: &UserId) -> bool {
        if self.is_owned_by(user) || self.is_interested(user) {
            return false;
        }
        self.inner.interested_users.push(user.clone());
        true
    }

    /// Remove `user` if present. Returns whether the set changed.
    pub fn remove_interest(&mut self, user: &UserId) -> bool {
        let before = self.inner.interested_users.len();
        self.inner.interested_users.retain(|entry| entry != user);
        self.inner.interested_users.len() != before
    }

    /// Decompose into raw stored attributes.
    pub fn into_snapshot(self) -> TravelIntentSnapshot {
        self.inner
    }
}

/// Criteria for listing intents. All present criteria must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelIntentFilter {
    /// Case-insensitive substring of the destination.
    pub destination: Option<String>,
    /// Inclusive lower bound on the start date.
    pub start_date_from: Option<NaiveDate>,
    pub active_only: bool,
    pub owner_id: Option<UserId>,
}

impl Default for TravelIntentFilter {
    fn default() -> Self {
        Self {
            destination: None,
            start_date_from: None,
            active_only: true,
            owner_id: None,
        }
    }
}

impl TravelIntentFilter {
    /// Evaluate the filter in memory.
    pub fn matches(&self, intent: &TravelIntent) -> bool {
        let destination_ok = self.destination.as_deref().is_none_or(|needle| {
            intent
                .destination()
                .as_ref()
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let start_ok = self
            .start_date_from
            .is_none_or(|from| intent.start_date() >= from);
        let active_ok = !self.active_only || intent.is_active();
        let owner_ok = self
            .owner_id
            .as_ref()
            .is_none_or(|owner| intent.is_owned_by(owner));
        destination_ok && start_ok && active_ok && owner_ok
    }
}
