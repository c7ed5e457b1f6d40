//! Travel intent API handlers.
//!
//! ```text
//! POST   /api/v1/travel-intents
//! GET    /api/v1/travel-intents?destination=bali&start_date=2024-05-01&skip=0&limit=20
//! GET    /api/v1/travel-intents/{id}
//! PUT    /api/v1/travel-intents/{id}
//! DELETE /api/v1/travel-intents/{id}
//! POST   /api/v1/travel-intents/{id}/interest
//! DELETE /api/v1/travel-intents/{id}/interest
//! ```
//!
//! Every route requires a bearer token.

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{page_request, parse_travel_intent_id};

pub use super::travel_intents_dto::{
    CreateTravelIntentRequest, TravelIntentListQuery, TravelIntentResponse,
    UpdateTravelIntentRequest,
};

/// Open a new travel intent owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/travel-intents",
    request_body = CreateTravelIntentRequest,
    responses(
        (status = 201, description = "Travel intent created", body = TravelIntentResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["travel-intents"],
    operation_id = "createTravelIntent",
    security(("bearer" = []))
)]
#[post("/travel-intents")]
pub async fn create_travel_intent(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<CreateTravelIntentRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.into_inner().into_draft()?;
    let intent = state
        .travel_intents
        .create(caller.user_id(), draft)
        .await?;
    Ok(HttpResponse::Created().json(TravelIntentResponse::from(&intent)))
}

/// List travel intents, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/travel-intents",
    params(TravelIntentListQuery),
    responses(
        (status = 200, description = "Matching travel intents", body = [TravelIntentResponse]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["travel-intents"],
    operation_id = "listTravelIntents",
    security(("bearer" = []))
)]
#[get("/travel-intents")]
pub async fn list_travel_intents(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    query: web::Query<TravelIntentListQuery>,
) -> ApiResult<web::Json<Vec<TravelIntentResponse>>> {
    let filter = query.to_filter()?;
    let page = page_request(query.skip, query.limit)?;
    let intents = state.travel_intents_query.list(&filter, page).await?;
    Ok(web::Json(
        intents.iter().map(TravelIntentResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/travel-intents/{id}",
    params(("id" = String, Path, description = "Travel intent id (UUID)")),
    responses(
        (status = 200, description = "Travel intent", body = TravelIntentResponse),
        (status = 400, description = "Malformed id", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "No such travel intent", body = Error)
    ),
    tags = ["travel-intents"],
    operation_id = "getTravelIntent",
    security(("bearer" = []))
)]
#[get("/travel-intents/{id}")]
pub async fn get_travel_intent(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<TravelIntentResponse>> {
    let id = parse_travel_intent_id(&path)?;
    let intent = state.travel_intents_query.get(&id).await?;
    Ok(web::Json(TravelIntentResponse::from(&intent)))
}

/// Partially update an intent the caller owns.
#[utoipa::path(
    put,
    path = "/api/v1/travel-intents/{id}",
    params(("id" = String, Path, description = "Travel intent id (UUID)")),
    request_body = UpdateTravelIntentRequest,
    responses(
        (status = 200, description = "Updated travel intent", body = TravelIntentResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Caller is not the owner", body = Error),
        (status = 404, description = "No such travel intent", body = Error)
    ),
    tags = ["travel-intents"],
    operation_id = "updateTravelIntent",
    security(("bearer" = []))
)]
#[put("/travel-intents/{id}")]
pub async fn update_travel_intent(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateTravelIntentRequest>,
) -> ApiResult<web::Json<TravelIntentResponse>> {
    let id = parse_travel_intent_id(&path)?;
    let patch = payload.into_inner().into_patch()?;
    let intent = state
        .travel_intents
        .update(&id, caller.user_id(), patch)
        .await?;
    Ok(web::Json(TravelIntentResponse::from(&intent)))
}

/// Deactivate an intent the caller owns. The record is kept.
#[utoipa::path(
    delete,
    path = "/api/v1/travel-intents/{id}",
    params(("id" = String, Path, description = "Travel intent id (UUID)")),
    responses(
        (status = 204, description = "Travel intent deactivated"),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Caller is not the owner", body = Error),
        (status = 404, description = "No such travel intent", body = Error)
    ),
    tags = ["travel-intents"],
    operation_id = "deactivateTravelIntent",
    security(("bearer" = []))
)]
#[delete("/travel-intents/{id}")]
pub async fn deactivate_travel_intent(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_travel_intent_id(&path)?;
    state
        .travel_intents
        .deactivate(&id, caller.user_id())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Join the interested set of someone else's intent.
#[utoipa::path(
    post,
    path = "/api/v1/travel-intents/{id}/interest",
    params(("id" = String, Path, description = "Travel intent id (UUID)")),
    responses(
        (status = 200, description = "Interest recorded", body = TravelIntentResponse),
        (status = 400, description = "Own intent or already interested", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "No such travel intent", body = Error)
    ),
    tags = ["travel-intents"],
    operation_id = "expressInterest",
    security(("bearer" = []))
)]
#[post("/travel-intents/{id}/interest")]
pub async fn express_interest(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<TravelIntentResponse>> {
    let id = parse_travel_intent_id(&path)?;
    let intent = state
        .travel_intents
        .express_interest(&id, caller.user_id())
        .await?;
    Ok(web::Json(TravelIntentResponse::from(&intent)))
}

/// Leave the interested set.
#[utoipa::path(
    delete,
    path = "/api/v1/travel-intents/{id}/interest",
    params(("id" = String, Path, description = "Travel intent id (UUID)")),
    responses(
        (status = 200, description = "Interest withdrawn", body = TravelIntentResponse),
        (status = 400, description = "Caller was not interested", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "No such travel intent", body = Error)
    ),
    tags = ["travel-intents"],
    operation_id = "removeInterest",
    security(("bearer" = []))
)]
#[delete("/travel-intents/{id}/interest")]
pub async fn remove_interest(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<TravelIntentResponse>> {
    let id = parse_travel_intent_id(&path)?;
    let intent = state
        .travel_intents
        .remove_interest(&id, caller.user_id())
        .await?;
    Ok(web::Json(TravelIntentResponse::from(&intent)))
}

#[cfg(test)]
#[path = "travel_intents_tests.rs"]
mod tests;
