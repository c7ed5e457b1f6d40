//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every handler under `/api/v1` plus the health checks,
//! registers the request and response bodies as components and declares the
//! `bearer` JWT security scheme that authenticated routes reference.
//!
//! The generated document is served by Swagger UI in debug builds.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    Error, ErrorCode, ExperienceLevel, TravelStyle, TripType, User, UserProfile,
};
use crate::inbound::http::accounts::{RegisterRequest, TokenRequest, TokenResponse};
use crate::inbound::http::travel_intents::{
    CreateTravelIntentRequest, TravelIntentResponse, UpdateTravelIntentRequest,
};
use crate::inbound::http::users::{ProfileUpdateRequest, UpdateUserRequest};

/// Adds the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let mut scheme = Http::new(HttpAuthScheme::Bearer);
        scheme.bearer_format = Some("JWT".to_owned());
        scheme.description =
            Some("Access token issued by POST /api/v1/auth/token.".to_owned());
        components.add_security_scheme("bearer", SecurityScheme::Http(scheme));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Backpacker Connect API",
        description = "Travel intents, interest matching and traveller accounts."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("bearer" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::issue_token,
        crate::inbound::http::accounts::current_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_me,
        crate::inbound::http::users::update_me,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::travel_intents::create_travel_intent,
        crate::inbound::http::travel_intents::list_travel_intents,
        crate::inbound::http::travel_intents::get_travel_intent,
        crate::inbound::http::travel_intents::update_travel_intent,
        crate::inbound::http::travel_intents::deactivate_travel_intent,
        crate::inbound::http::travel_intents::express_interest,
        crate::inbound::http::travel_intents::remove_interest,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        UserProfile,
        TravelStyle,
        ExperienceLevel,
        TripType,
        RegisterRequest,
        TokenRequest,
        TokenResponse,
        UpdateUserRequest,
        ProfileUpdateRequest,
        CreateTravelIntentRequest,
        UpdateTravelIntentRequest,
        TravelIntentResponse,
    )),
    tags(
        (name = "auth", description = "Registration and token issuance"),
        (name = "users", description = "Traveller records"),
        (name = "travel-intents", description = "Trips and interest matching"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
