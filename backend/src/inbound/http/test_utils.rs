//! Test helpers for inbound HTTP components.
//!
//! Builds the real domain services over the in-memory adapters so handler
//! tests exercise the full request path without a database.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test as actix_test, web};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use serde_json::{Value, json};

use crate::Trace;
use crate::domain::{IdentityService, TravelIntentService};
use crate::inbound::http::api_scope;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::{InMemoryTravelIntentRepository, InMemoryUserRepository};
use crate::outbound::security::{Argon2PasswordHasher, JwtTokenService};

/// Clock that advances one second per reading, so records created in
/// sequence get strictly increasing timestamps.
pub struct TickingClock {
    base: DateTime<Utc>,
    ticks: AtomicI64,
}

impl TickingClock {
    pub fn new() -> Self {
        Self {
            base: Utc
                .with_ymd_and_hms(2024, 4, 1, 8, 0, 0)
                .single()
                .expect("valid base timestamp"),
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for TickingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.base + Duration::seconds(tick)
    }
}

/// Handler state over fresh in-memory stores.
pub fn memory_state() -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(TickingClock::new());
    let hasher = Argon2PasswordHasher::with_params(8, 1, 1).expect("cheap argon2 params");
    let tokens = JwtTokenService::new(b"handler-tests", Duration::days(7), Arc::clone(&clock));
    HttpState::from_services(
        TravelIntentService::new(
            Arc::new(InMemoryTravelIntentRepository::new()),
            Arc::clone(&clock),
        ),
        IdentityService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(hasher),
            Arc::new(tokens),
            clock,
        ),
    )
}

/// App serving the versioned API over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(api_scope())
}

/// A registered user and a bearer token for them.
pub struct SignedInUser {
    pub id: String,
    pub token: String,
}

impl SignedInUser {
    pub fn bearer(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token))
    }
}

/// Register `username` and log in, returning the id and token.
pub async fn sign_up<S>(app: &S, username: &str) -> SignedInUser
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let email = format!("{username}@example.com");
    let register = actix_test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "email": email,
            "username": username,
            "fullName": "Test Traveller",
            "password": "correct horse battery",
        }))
        .to_request();
    let created: Value = actix_test::call_and_read_body_json(app, register).await;
    let id = created["id"].as_str().expect("user id").to_owned();

    let login = actix_test::TestRequest::post()
        .uri("/api/v1/auth/token")
        .set_json(json!({ "email": email, "password": "correct horse battery" }))
        .to_request();
    let issued: Value = actix_test::call_and_read_body_json(app, login).await;
    let token = issued["access_token"]
        .as_str()
        .expect("access token")
        .to_owned();

    SignedInUser { id, token }
}

/// Read a response body as JSON.
pub async fn json_body(response: ServiceResponse) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("JSON body")
}
