//! Account handlers: sign-up, token issuance and the caller's own record.
//!
//! ```text
//! POST /api/v1/auth/register {"email":"ana@example.com","username":"ana","fullName":"Ana Souza","password":"..."}
//! POST /api/v1/auth/token    {"email":"ana@example.com","password":"..."}
//! POST /api/v1/auth/token    username=ana%40example.com&password=...   (form)
//! GET  /api/v1/auth/me
//! ```

use actix_web::{Either, HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, LoginCredentials, RegistrationRequest, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, credential_field_error, missing_field_error};

/// Body of `POST /api/v1/auth/register`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "ana@example.com")]
    pub email: Option<String>,
    #[schema(example = "ana")]
    pub username: Option<String>,
    #[serde(alias = "full_name")]
    #[schema(example = "Ana Souza")]
    pub full_name: Option<String>,
    pub password: Option<String>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, Error> {
    value.ok_or_else(|| missing_field_error(FieldName::new(field)))
}

impl RegisterRequest {
    fn into_domain(self) -> Result<RegistrationRequest, Error> {
        let email = required(self.email, "email")?;
        let username = required(self.username, "username")?;
        let full_name = required(self.full_name, "fullName")?;
        let password = zeroize::Zeroizing::new(required(self.password, "password")?);
        RegistrationRequest::try_from_parts(&email, &username, &full_name, &password)
            .map_err(credential_field_error)
    }
}

/// Credentials for `POST /api/v1/auth/token`, as JSON or as an OAuth2
/// password form where `username` carries the email.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct TokenRequest {
    #[serde(alias = "username")]
    #[schema(example = "ana@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TokenRequest {
    fn into_credentials(self) -> Result<LoginCredentials, Error> {
        let email = self.email.unwrap_or_default();
        let password = zeroize::Zeroizing::new(self.password.unwrap_or_default());
        LoginCredentials::try_from_parts(&email, &password).map_err(credential_field_error)
    }
}

/// Issued bearer token, in the OAuth2 token response shape.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email or username already taken", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner().into_domain()?;
    let user = state.registration.register(request).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Exchange credentials for a bearer token.
///
/// Every credential failure answers the same 401 so callers cannot test
/// which emails exist.
#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    request_body(
        content(
            (TokenRequest = "application/json"),
            (TokenRequest = "application/x-www-form-urlencoded")
        )
    ),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    operation_id = "issueToken",
    security([])
)]
#[post("/auth/token")]
pub async fn issue_token(
    state: web::Data<HttpState>,
    payload: Either<web::Json<TokenRequest>, web::Form<TokenRequest>>,
) -> ApiResult<web::Json<TokenResponse>> {
    let request = match payload {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };
    let credentials = request.into_credentials()?;
    let token = state.login.login(&credentials).await?;
    Ok(web::Json(TokenResponse {
        access_token: token.as_str().to_owned(),
        token_type: "bearer".to_owned(),
        expires_at: token.expires_at(),
    }))
}

/// The caller's own record.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Missing, expired or invalid token", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentUser",
    security(("bearer" = []))
)]
#[get("/auth/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<User>> {
    let user = state.users.current_user(caller.user_id()).await?;
    Ok(web::Json(user))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
