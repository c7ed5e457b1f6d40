//! Bearer token authentication for HTTP handlers.
//!
//! Handlers that need a caller take an [`AuthenticatedUser`] argument; the
//! extractor reads `Authorization: Bearer <token>` and resolves the subject
//! through the [`AccessTokenVerifier`](crate::domain::ports::AccessTokenVerifier)
//! port held in [`HttpState`].

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};
use serde_json::json;

use crate::domain::{Error, UserId};

use super::state::HttpState;

/// Subject of a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    pub fn user_id(&self) -> &UserId {
        &self.0
    }

    pub fn into_inner(self) -> UserId {
        self.0
    }
}

fn missing_token() -> Error {
    Error::unauthorized("missing bearer token").with_details(json!({ "code": "token_missing" }))
}

/// Token part of an `Authorization` header using the bearer scheme.
fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(missing_token)?
        .to_str()
        .map_err(|_| missing_token())?;
    let (scheme, token) = header.trim().split_once(' ').ok_or_else(missing_token)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(missing_token());
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(missing_token());
    }
    Ok(token)
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))?;
    let token = bearer_token(req)?;
    state.tokens.verify(token).map(AuthenticatedUser)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
