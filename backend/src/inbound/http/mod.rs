//! HTTP inbound adapter exposing the REST API under `/api/v1`.

pub mod accounts;
pub mod auth;
pub mod error;
pub mod health;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod travel_intents;
mod travel_intents_dto;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

use error::{form_error_handler, json_error_handler, query_error_handler};

/// Every versioned API route, with extractor errors reported in the
/// standard error payload.
///
/// The scope expects `web::Data<HttpState>` to be registered on the app.
pub fn api_scope() -> actix_web::Scope {
    web::scope("/api/v1")
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::FormConfig::default().error_handler(form_error_handler))
        .service(accounts::register)
        .service(accounts::issue_token)
        .service(accounts::current_user)
        .service(users::list_users)
        .service(users::get_me)
        .service(users::update_me)
        .service(users::get_user)
        .service(users::update_user)
        .service(travel_intents::create_travel_intent)
        .service(travel_intents::list_travel_intents)
        .service(travel_intents::get_travel_intent)
        .service(travel_intents::update_travel_intent)
        .service(travel_intents::deactivate_travel_intent)
        .service(travel_intents::express_interest)
        .service(travel_intents::remove_interest)
}
