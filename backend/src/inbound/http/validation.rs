//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every rejection produced here is an `invalid_request` error whose
//! `details` carry the wire field name and a stable code.

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::{
    CredentialValidationError, Error, PageRequest, PageRequestError, TravelIntentId,
    TravelIntentValidationError, TripType, UserId, UserValidationError,
};

/// Validation error codes raised by the HTTP layer itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidDate,
    InvalidEnum,
    OutOfRange,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidEnum => "invalid_enum",
            ErrorCode::OutOfRange => "out_of_range",
        }
    }
}

/// Wire name of a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, code: &str, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

fn field_value_error(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        name,
        ErrorCode::MissingField.as_str(),
        format!("missing required field: {name}"),
    )
}

pub(crate) fn parse_travel_intent_id(raw: &str) -> Result<TravelIntentId, Error> {
    TravelIntentId::new(raw).map_err(|_| {
        field_value_error(
            FieldName::new("id"),
            ErrorCode::InvalidUuid,
            "travel intent id must be a valid UUID".to_owned(),
            raw,
        )
    })
}

pub(crate) fn parse_user_id(raw: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|_| {
        field_value_error(
            field,
            ErrorCode::InvalidUuid,
            format!("{} must be a valid UUID", field.as_str()),
            raw,
        )
    })
}

/// Parse an ISO 8601 calendar date (`YYYY-MM-DD`).
pub(crate) fn parse_date(raw: &str, field: FieldName) -> Result<NaiveDate, Error> {
    raw.trim().parse::<NaiveDate>().map_err(|_| {
        field_value_error(
            field,
            ErrorCode::InvalidDate,
            format!("{} must be a YYYY-MM-DD date", field.as_str()),
            raw,
        )
    })
}

pub(crate) fn parse_trip_types(raw: Vec<String>) -> Result<Vec<TripType>, Error> {
    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            TripType::parse(value.trim()).ok_or_else(|| {
                Error::invalid_request(format!("unknown trip type: {value}")).with_details(json!({
                    "field": "tripType",
                    "index": index,
                    "value": value,
                    "code": ErrorCode::InvalidEnum.as_str(),
                }))
            })
        })
        .collect()
}

/// Build a page window from optional `skip` / `limit` query values.
pub(crate) fn page_request(skip: Option<u32>, limit: Option<u32>) -> Result<PageRequest, Error> {
    PageRequest::new(skip, limit).map_err(|err| match err {
        PageRequestError::ZeroLimit => field_error(
            "limit",
            ErrorCode::OutOfRange.as_str(),
            err.to_string(),
        ),
    })
}

pub(crate) fn travel_intent_field_error(err: TravelIntentValidationError) -> Error {
    field_error(err.field(), err.code(), err.to_string())
}

pub(crate) fn user_field_error(err: UserValidationError) -> Error {
    field_error(err.field(), err.code(), err.to_string())
}

pub(crate) fn credential_field_error(err: CredentialValidationError) -> Error {
    field_error(err.field(), err.code(), err.to_string())
}
