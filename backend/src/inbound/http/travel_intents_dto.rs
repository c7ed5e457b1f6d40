//! Request and response bodies for the travel intent endpoints.
//!
//! Requests accept camelCase keys and, for compatibility with older clients,
//! their snake_case spellings. Responses are camelCase.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{
    Activities, BudgetRange, Description, Destination, Error, MaxTravelers, TravelIntent,
    TravelIntentDraft, TravelIntentFilter, TravelIntentPatch, TripType, TripTypes, UserId,
};

use super::validation::{
    FieldName, missing_field_error, parse_date, parse_trip_types, parse_user_id,
    travel_intent_field_error,
};

/// Distinguish an absent key (`None`) from an explicit `null`
/// (`Some(None)`). Pair with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

const START_DATE: FieldName = FieldName::new("startDate");
const END_DATE: FieldName = FieldName::new("endDate");

/// Body of `POST /api/v1/travel-intents`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTravelIntentRequest {
    #[schema(example = "Hanoi")]
    pub destination: Option<String>,
    #[serde(alias = "start_date")]
    #[schema(example = "2024-05-01")]
    pub start_date: Option<String>,
    #[serde(alias = "end_date")]
    #[schema(example = "2024-05-14")]
    pub end_date: Option<String>,
    #[serde(default, alias = "flexible_dates")]
    pub flexible_dates: bool,
    pub description: Option<String>,
    #[serde(default, alias = "trip_type")]
    #[schema(example = json!(["food_tour", "cultural"]))]
    pub trip_type: Vec<String>,
    #[serde(alias = "max_travelers")]
    pub max_travelers: Option<i64>,
    #[serde(alias = "budget_range")]
    pub budget_range: Option<String>,
    #[serde(default)]
    pub activities: Vec<String>,
}

impl CreateTravelIntentRequest {
    /// Validate every field into a domain draft.
    pub fn into_draft(self) -> Result<TravelIntentDraft, Error> {
        let Self {
            destination,
            start_date,
            end_date,
            flexible_dates,
            description,
            trip_type,
            max_travelers,
            budget_range,
            activities,
        } = self;

        let destination = destination
            .ok_or_else(|| missing_field_error(FieldName::new("destination")))?;
        let start_date = start_date.ok_or_else(|| missing_field_error(START_DATE))?;

        Ok(TravelIntentDraft {
            destination: Destination::new(&destination).map_err(travel_intent_field_error)?,
            start_date: parse_date(&start_date, START_DATE)?,
            end_date: end_date
                .map(|raw| parse_date(&raw, END_DATE))
                .transpose()?,
            flexible_dates,
            description: description
                .map(|raw| Description::new(&raw))
                .transpose()
                .map_err(travel_intent_field_error)?,
            trip_types: TripTypes::new(parse_trip_types(trip_type)?),
            max_travelers: max_travelers
                .map(MaxTravelers::new)
                .transpose()
                .map_err(travel_intent_field_error)?,
            budget_range: budget_range
                .map(|raw| BudgetRange::new(&raw))
                .transpose()
                .map_err(travel_intent_field_error)?,
            activities: Activities::new(activities).map_err(travel_intent_field_error)?,
        })
    }
}

/// Body of `PUT /api/v1/travel-intents/{id}`. Absent keys are left
/// untouched; `null` clears optional fields.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTravelIntentRequest {
    pub destination: Option<String>,
    #[serde(alias = "start_date")]
    pub start_date: Option<String>,
    #[serde(default, alias = "end_date", deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, nullable)]
    pub end_date: Option<Option<String>>,
    #[serde(alias = "flexible_dates")]
    pub flexible_dates: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, nullable)]
    pub description: Option<Option<String>>,
    #[serde(alias = "trip_type")]
    pub trip_type: Option<Vec<String>>,
    #[serde(default, alias = "max_travelers", deserialize_with = "nullable")]
    #[schema(value_type = Option<i64>, nullable)]
    pub max_travelers: Option<Option<i64>>,
    #[serde(default, alias = "budget_range", deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, nullable)]
    pub budget_range: Option<Option<String>>,
    pub activities: Option<Vec<String>>,
    #[serde(alias = "is_active")]
    pub is_active: Option<bool>,
}

impl UpdateTravelIntentRequest {
    /// Validate present fields into a domain patch.
    pub fn into_patch(self) -> Result<TravelIntentPatch, Error> {
        let Self {
            destination,
            start_date,
            end_date,
            flexible_dates,
            description,
            trip_type,
            max_travelers,
            budget_range,
            activities,
            is_active,
        } = self;

        Ok(TravelIntentPatch {
            destination: destination
                .map(|raw| Destination::new(&raw))
                .transpose()
                .map_err(travel_intent_field_error)?,
            start_date: start_date
                .map(|raw| parse_date(&raw, START_DATE))
                .transpose()?,
            end_date: end_date
                .map(|value| value.map(|raw| parse_date(&raw, END_DATE)).transpose())
                .transpose()?,
            flexible_dates,
            description: description
                .map(|value| value.map(|raw| Description::new(&raw)).transpose())
                .transpose()
                .map_err(travel_intent_field_error)?,
            trip_types: trip_type
                .map(parse_trip_types)
                .transpose()?
                .map(TripTypes::new),
            max_travelers: max_travelers
                .map(|value| value.map(MaxTravelers::new).transpose())
                .transpose()
                .map_err(travel_intent_field_error)?,
            budget_range: budget_range
                .map(|value| value.map(|raw| BudgetRange::new(&raw)).transpose())
                .transpose()
                .map_err(travel_intent_field_error)?,
            activities: activities
                .map(Activities::new)
                .transpose()
                .map_err(travel_intent_field_error)?,
            is_active,
        })
    }
}

/// Query string of `GET /api/v1/travel-intents`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TravelIntentListQuery {
    /// Case-insensitive substring of the destination.
    pub destination: Option<String>,
    /// Only intents starting on or after this date (`YYYY-MM-DD`).
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    /// Defaults to `true`.
    #[serde(alias = "activeOnly")]
    pub active_only: Option<bool>,
    /// Only intents owned by this user id.
    #[serde(alias = "ownerId")]
    pub owner_id: Option<String>,
    pub skip: Option<u32>,
    /// 1 to 100, default 20; larger values are clamped.
    pub limit: Option<u32>,
}

impl TravelIntentListQuery {
    pub fn to_filter(&self) -> Result<TravelIntentFilter, Error> {
        let destination = self
            .destination
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned);
        Ok(TravelIntentFilter {
            destination,
            start_date_from: self
                .start_date
                .as_deref()
                .map(|raw| parse_date(raw, FieldName::new("start_date")))
                .transpose()?,
            active_only: self.active_only.unwrap_or(true),
            owner_id: self
                .owner_id
                .as_deref()
                .map(|raw| parse_user_id(raw, FieldName::new("owner_id")))
                .transpose()?,
        })
    }
}

/// Travel intent as returned to clients, including derived fields.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TravelIntentResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub flexible_dates: bool,
    pub description: Option<String>,
    pub trip_type: Vec<TripType>,
    pub max_travelers: Option<u16>,
    pub budget_range: Option<String>,
    pub activities: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
    #[schema(value_type = Vec<String>)]
    pub interested_users: Vec<UserId>,
    pub interested_users_count: usize,
    pub has_group: bool,
    pub group_id: Option<Uuid>,
}

impl From<&TravelIntent> for TravelIntentResponse {
    fn from(intent: &TravelIntent) -> Self {
        Self {
            id: *intent.id().as_uuid(),
            user_id: *intent.owner_id().as_uuid(),
            destination: intent.destination().as_ref().to_owned(),
            start_date: intent.start_date(),
            end_date: intent.end_date(),
            flexible_dates: intent.flexible_dates(),
            description: intent.description().map(|text| text.as_ref().to_owned()),
            trip_type: intent.trip_types().as_slice().to_vec(),
            max_travelers: intent.max_travelers().map(MaxTravelers::get),
            budget_range: intent.budget_range().map(|text| text.as_ref().to_owned()),
            activities: intent.activities().as_slice().to_vec(),
            created_at: intent.created_at(),
            updated_at: intent.updated_at(),
            is_active: intent.is_active(),
            interested_users: intent.interested_users().to_vec(),
            interested_users_count: intent.interested_users_count(),
            has_group: intent.has_group(),
            group_id: intent.group_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn create_accepts_snake_case_keys() {
        let request: CreateTravelIntentRequest = serde_json::from_value(json!({
            "destination": "Hanoi",
            "start_date": "2024-05-01",
            "trip_type": ["food_tour", "food_tour", "cultural"],
            "max_travelers": 4
        }))
        .expect("valid body");

        let draft = request.into_draft().expect("valid draft");
        assert_eq!(draft.destination.as_ref(), "Hanoi");
        assert_eq!(
            draft.trip_types.as_slice(),
            &[TripType::FoodTour, TripType::Cultural]
        );
        assert_eq!(draft.max_travelers.map(MaxTravelers::get), Some(4));
    }

    #[rstest]
    fn create_reports_missing_start_date() {
        let request = CreateTravelIntentRequest {
            destination: Some("Hanoi".into()),
            ..CreateTravelIntentRequest::default()
        };
        let err = request.into_draft().expect_err("missing start");
        let details = err.details().expect("details");
        assert_eq!(details["field"], "startDate");
        assert_eq!(details["code"], "missing_field");
    }

    #[rstest]
    fn update_distinguishes_null_from_absent() {
        let request: UpdateTravelIntentRequest = serde_json::from_value(json!({
            "endDate": null,
            "flexibleDates": true
        }))
        .expect("valid body");
        assert_eq!(request.end_date, Some(None));
        assert_eq!(request.description, None);

        let patch = request.into_patch().expect("valid patch");
        assert_eq!(patch.end_date, Some(None));
        assert_eq!(patch.description, None);
        assert_eq!(patch.flexible_dates, Some(true));
    }

    #[rstest]
    #[case(json!({ "max_travelers": 0 }), "maxTravelers")]
    #[case(json!({ "destination": "X" }), "destination")]
    #[case(json!({ "activities": [""] }), "activities")]
    fn update_rejects_invalid_values(#[case] body: serde_json::Value, #[case] field: &str) {
        let request: UpdateTravelIntentRequest = serde_json::from_value(body).expect("shape");
        let err = request.into_patch().expect_err("invalid");
        assert_eq!(err.details().expect("details")["field"], field);
    }

    #[rstest]
    fn list_query_defaults_to_active_only_and_rejects_bad_owner() {
        let filter = TravelIntentListQuery::default()
            .to_filter()
            .expect("default filter");
        assert!(filter.active_only);

        let err = TravelIntentListQuery {
            owner_id: Some("u1".into()),
            ..TravelIntentListQuery::default()
        }
        .to_filter()
        .expect_err("owner must be a uuid");
        assert_eq!(err.details().expect("details")["code"], "invalid_uuid");
    }
}
