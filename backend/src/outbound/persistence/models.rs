//! Diesel row structs and their conversion to and from domain types.
//!
//! Rows are internal to the persistence layer. Stored values are re-checked
//! by the domain constructors when read back; a row that fails those checks
//! is reported as a decode error rather than served.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Activities, BudgetRange, Description, Destination, EmailAddress, FullName, MaxTravelers,
    PasswordHash, TravelIntent, TravelIntentId, TravelIntentSnapshot, TripType, TripTypes, User,
    UserAccount, UserId, UserProfile, Username,
};

use super::schema::{travel_intents, users};

/// A stored row violated a domain constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored {table}.{column} is invalid: {reason}")]
pub(crate) struct RowDecodeError {
    pub table: &'static str,
    pub column: &'static str,
    pub reason: String,
}

impl RowDecodeError {
    fn new(table: &'static str, column: &'static str, reason: impl ToString) -> Self {
        Self {
            table,
            column,
            reason: reason.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub password_hash: String,
    pub profile: serde_json::Value,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns a profile update may change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub username: &'a str,
    pub full_name: &'a str,
    pub profile: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

fn user_error(column: &'static str, reason: impl ToString) -> RowDecodeError {
    RowDecodeError::new("users", column, reason)
}

pub(crate) fn profile_json(profile: &UserProfile) -> Result<serde_json::Value, RowDecodeError> {
    serde_json::to_value(profile).map_err(|err| user_error("profile", err))
}

impl UserRow {
    pub fn from_account(account: &UserAccount) -> Result<Self, RowDecodeError> {
        let user = &account.user;
        Ok(Self {
            id: *user.id.as_uuid(),
            email: user.email.as_ref().to_owned(),
            username: user.username.as_ref().to_owned(),
            full_name: user.full_name.as_ref().to_owned(),
            password_hash: account.password_hash.as_str().to_owned(),
            profile: profile_json(&user.profile)?,
            is_verified: user.is_verified,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }

    pub fn into_account(self) -> Result<UserAccount, RowDecodeError> {
        let password_hash = PasswordHash::new(self.password_hash.clone());
        Ok(UserAccount {
            user: self.into_user()?,
            password_hash,
        })
    }

    pub fn into_user(self) -> Result<User, RowDecodeError> {
        Ok(User {
            id: UserId::from_uuid(self.id),
            email: EmailAddress::new(&self.email).map_err(|err| user_error("email", err))?,
            username: Username::new(self.username).map_err(|err| user_error("username", err))?,
            full_name: FullName::new(&self.full_name)
                .map_err(|err| user_error("full_name", err))?,
            profile: serde_json::from_value(self.profile)
                .map_err(|err| user_error("profile", err))?,
            is_verified: self.is_verified,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Travel intents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = travel_intents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TravelIntentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub flexible_dates: bool,
    pub description: Option<String>,
    pub trip_types: Vec<String>,
    pub max_travelers: Option<i16>,
    pub budget_range: Option<String>,
    pub activities: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
    pub interested_users: Vec<Uuid>,
    pub group_id: Option<Uuid>,
}

/// Owner-editable columns. `None` writes `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = travel_intents)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct TravelIntentChangeset {
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub flexible_dates: bool,
    pub description: Option<String>,
    pub trip_types: Vec<String>,
    pub max_travelers: Option<i16>,
    pub budget_range: Option<String>,
    pub activities: Vec<String>,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

fn intent_error(column: &'static str, reason: impl ToString) -> RowDecodeError {
    RowDecodeError::new("travel_intents", column, reason)
}

fn trip_type_names(types: &TripTypes) -> Vec<String> {
    types
        .as_slice()
        .iter()
        .map(|trip_type| trip_type.as_str().to_owned())
        .collect()
}

fn max_travelers_column(value: Option<MaxTravelers>) -> Option<i16> {
    value.and_then(|max| i16::try_from(max.get()).ok())
}

impl From<&TravelIntent> for TravelIntentRow {
    fn from(intent: &TravelIntent) -> Self {
        Self {
            id: *intent.id().as_uuid(),
            user_id: *intent.owner_id().as_uuid(),
            destination: intent.destination().as_ref().to_owned(),
            start_date: intent.start_date(),
            end_date: intent.end_date(),
            flexible_dates: intent.flexible_dates(),
            description: intent.description().map(|text| text.as_ref().to_owned()),
            trip_types: trip_type_names(intent.trip_types()),
            max_travelers: max_travelers_column(intent.max_travelers()),
            budget_range: intent.budget_range().map(|text| text.as_ref().to_owned()),
            activities: intent.activities().as_slice().to_vec(),
            created_at: intent.created_at(),
            updated_at: intent.updated_at(),
            is_active: intent.is_active(),
            interested_users: intent
                .interested_users()
                .iter()
                .map(|user| *user.as_uuid())
                .collect(),
            group_id: intent.group_id(),
        }
    }
}

impl From<&TravelIntent> for TravelIntentChangeset {
    fn from(intent: &TravelIntent) -> Self {
        let row = TravelIntentRow::from(intent);
        Self {
            destination: row.destination,
            start_date: row.start_date,
            end_date: row.end_date,
            flexible_dates: row.flexible_dates,
            description: row.description,
            trip_types: row.trip_types,
            max_travelers: row.max_travelers,
            budget_range: row.budget_range,
            activities: row.activities,
            is_active: row.is_active,
            updated_at: row.updated_at,
        }
    }
}

impl TryFrom<TravelIntentRow> for TravelIntent {
    type Error = RowDecodeError;

    fn try_from(row: TravelIntentRow) -> Result<Self, Self::Error> {
        let trip_types = row
            .trip_types
            .iter()
            .map(|raw| {
                TripType::parse(raw)
                    .ok_or_else(|| intent_error("trip_types", format!("unknown tag {raw:?}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let snapshot = TravelIntentSnapshot {
            id: TravelIntentId::from_uuid(row.id),
            owner_id: UserId::from_uuid(row.user_id),
            destination: Destination::new(&row.destination)
                .map_err(|err| intent_error("destination", err))?,
            start_date: row.start_date,
            end_date: row.end_date,
            flexible_dates: row.flexible_dates,
            description: row
                .description
                .as_deref()
                .map(Description::new)
                .transpose()
                .map_err(|err| intent_error("description", err))?,
            trip_types: TripTypes::new(trip_types),
            max_travelers: row
                .max_travelers
                .map(|value| MaxTravelers::new(i64::from(value)))
                .transpose()
                .map_err(|err| intent_error("max_travelers", err))?,
            budget_range: row
                .budget_range
                .as_deref()
                .map(BudgetRange::new)
                .transpose()
                .map_err(|err| intent_error("budget_range", err))?,
            activities: Activities::new(row.activities)
                .map_err(|err| intent_error("activities", err))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            is_active: row.is_active,
            interested_users: row
                .interested_users
                .into_iter()
                .map(UserId::from_uuid)
                .collect(),
            group_id: row.group_id,
        };
        Ok(TravelIntent::restore(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TravelIntentDraft;
    use chrono::TimeZone;
    use rstest::rstest;

    fn sample_intent() -> TravelIntent {
        let now = Utc
            .with_ymd_and_hms(2024, 2, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        let mut intent = TravelIntent::create(
            TravelIntentId::random(),
            UserId::random(),
            TravelIntentDraft {
                destination: Destination::new("Hanoi").expect("destination"),
                start_date: NaiveDate::from_ymd_opt(2024, 5, 1).expect("date"),
                end_date: NaiveDate::from_ymd_opt(2024, 5, 14),
                flexible_dates: false,
                description: Some(Description::new("Street food crawl").expect("description")),
                trip_types: TripTypes::new(vec![TripType::FoodTour, TripType::City]),
                max_travelers: Some(MaxTravelers::new(4).expect("max travelers")),
                budget_range: Some(BudgetRange::new("$1000-2000").expect("budget")),
                activities: Activities::new(vec!["pho".to_owned()]).expect("activities"),
            },
            now,
        )
        .expect("valid intent");
        intent.add_interest(&UserId::random());
        intent
    }

    #[rstest]
    fn travel_intent_survives_row_conversion() {
        let intent = sample_intent();
        let row = TravelIntentRow::from(&intent);
        assert_eq!(row.trip_types, ["food_tour", "city"]);
        assert_eq!(row.max_travelers, Some(4));

        let restored = TravelIntent::try_from(row).expect("decodes");
        assert_eq!(restored, intent);
    }

    #[rstest]
    fn unknown_trip_type_is_a_decode_error() {
        let mut row = TravelIntentRow::from(&sample_intent());
        row.trip_types = vec!["spaceflight".to_owned()];

        let err = TravelIntent::try_from(row).expect_err("unknown tag");
        assert_eq!(err.column, "trip_types");
    }

    #[rstest]
    fn owner_listed_as_interested_is_dropped_on_read() {
        let mut row = TravelIntentRow::from(&sample_intent());
        row.interested_users.push(row.user_id);
        row.interested_users.push(row.interested_users[0]);

        let restored = TravelIntent::try_from(row).expect("decodes");
        assert_eq!(restored.interested_users_count(), 1);
    }
}
