//! User record handlers.
//!
//! ```text
//! GET /api/v1/users?skip=0&limit=20
//! GET /api/v1/users/me
//! PUT /api/v1/users/me {"fullName":"Ana S.","profile":{"location":"Lisbon"}}
//! GET /api/v1/users/{id}
//! PUT /api/v1/users/{id}
//! ```
//!
//! `/users/me` is registered ahead of `/users/{id}` so the literal segment
//! wins.

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Error, ExperienceLevel, FullName, ProfilePatch, TravelStyle, User, UserId, UserUpdate,
    Username,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::travel_intents_dto::nullable;
use crate::inbound::http::validation::{FieldName, page_request, parse_user_id, user_field_error};

/// Profile fields to change; absent keys are kept, `null` clears.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, nullable)]
    pub bio: Option<Option<String>>,
    #[serde(default, alias = "profile_picture", deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, nullable)]
    pub profile_picture: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, nullable)]
    pub location: Option<Option<String>>,
    pub interests: Option<Vec<String>>,
    #[serde(default, alias = "travel_style", deserialize_with = "nullable")]
    #[schema(value_type = Option<TravelStyle>, nullable)]
    pub travel_style: Option<Option<TravelStyle>>,
    #[serde(default, alias = "experience_level", deserialize_with = "nullable")]
    #[schema(value_type = Option<ExperienceLevel>, nullable)]
    pub experience_level: Option<Option<ExperienceLevel>>,
    pub languages: Option<Vec<String>>,
}

impl From<ProfileUpdateRequest> for ProfilePatch {
    fn from(value: ProfileUpdateRequest) -> Self {
        Self {
            bio: value.bio,
            profile_picture: value.profile_picture,
            location: value.location,
            interests: value.interests,
            travel_style: value.travel_style,
            experience_level: value.experience_level,
            languages: value.languages,
        }
    }
}

/// Body of `PUT /api/v1/users/{id}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    #[serde(alias = "full_name")]
    pub full_name: Option<String>,
    pub profile: Option<ProfileUpdateRequest>,
}

impl UpdateUserRequest {
    fn into_update(self) -> Result<UserUpdate, Error> {
        let update = UserUpdate {
            username: self
                .username
                .map(Username::new)
                .transpose()
                .map_err(user_field_error)?,
            full_name: self
                .full_name
                .map(FullName::new)
                .transpose()
                .map_err(user_field_error)?,
            profile: self.profile.map(ProfilePatch::from),
        };
        if update.is_empty() {
            return Err(Error::invalid_request("no fields to update")
                .with_details(json!({ "code": "empty_update" })));
        }
        Ok(update)
    }
}

/// Pagination for `GET /api/v1/users`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub skip: Option<u32>,
    /// 1 to 100, default 20; larger values are clamped.
    pub limit: Option<u32>,
}

const USER_ID: FieldName = FieldName::new("id");

/// List active users, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security(("bearer" = []))
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    query: web::Query<UserListQuery>,
) -> ApiResult<web::Json<Vec<User>>> {
    let page = page_request(query.skip, query.limit)?;
    Ok(web::Json(state.users.list_users(page).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["users"],
    operation_id = "getCurrentUser",
    security(("bearer" = []))
)]
#[get("/users/me")]
pub async fn get_me(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<User>> {
    Ok(web::Json(state.users.current_user(caller.user_id()).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 409, description = "Username already taken", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser",
    security(("bearer" = []))
)]
#[put("/users/me")]
pub async fn update_me(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    let update = payload.into_inner().into_update()?;
    let me = caller.into_inner();
    Ok(web::Json(state.profiles.update_profile(&me, &me, update).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id (UUID)")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Malformed id", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser",
    security(("bearer" = []))
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path, USER_ID)?;
    Ok(web::Json(state.users.get_user(&id).await?))
}

/// Update a user record; only the user themselves may do so.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User id (UUID)")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Not the caller's record", body = Error),
        (status = 404, description = "No such user", body = Error),
        (status = 409, description = "Username already taken", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser",
    security(("bearer" = []))
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    let target: UserId = parse_user_id(&path, USER_ID)?;
    let update = payload.into_inner().into_update()?;
    Ok(web::Json(
        state
            .profiles
            .update_profile(caller.user_id(), &target, update)
            .await?,
    ))
}
