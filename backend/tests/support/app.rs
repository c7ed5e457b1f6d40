//! In-process application over in-memory stores for integration suites.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test as actix_test, web};
use backpacker_connect::Trace;
use backpacker_connect::domain::{IdentityService, TravelIntentService};
use backpacker_connect::inbound::http::api_scope;
use backpacker_connect::inbound::http::state::HttpState;
use backpacker_connect::outbound::memory::{InMemoryTravelIntentRepository, InMemoryUserRepository};
use backpacker_connect::outbound::security::{Argon2PasswordHasher, JwtTokenService};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use serde_json::{Value, json};

pub(crate) const PASSWORD: &str = "correct horse battery";

/// Clock advancing one second per reading.
pub(crate) struct TickingClock {
    base: DateTime<Utc>,
    ticks: AtomicI64,
}

impl TickingClock {
    pub(crate) fn new() -> Self {
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
        self.base + Duration::seconds(self.ticks.fetch_add(1, Ordering::SeqCst))
    }
}

/// Handler state with both services over fresh in-memory stores.
pub(crate) fn memory_state() -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(TickingClock::new());
    let hasher = Argon2PasswordHasher::with_params(8, 1, 1).expect("cheap argon2 params");
    let tokens = JwtTokenService::new(b"integration", Duration::days(7), Arc::clone(&clock));
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

pub(crate) fn app(
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

/// Status and JSON body (`Null` when empty) of a response.
pub(crate) async fn read_response(response: ServiceResponse) -> (u16, Value) {
    let status = response.status().as_u16();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

/// Send `request` to a freshly initialised app sharing `state`.
pub(crate) async fn send(state: &HttpState, request: actix_http::Request) -> (u16, Value) {
    let service = actix_test::init_service(app(state.clone())).await;
    read_response(actix_test::call_service(&service, request).await).await
}

pub(crate) fn registration(username: &str) -> Value {
    json!({
        "email": format!("{username}@example.com"),
        "username": username,
        "fullName": "Test Traveller",
        "password": PASSWORD,
    })
}

/// Register `username` and return `(user id, bearer token)`.
pub(crate) async fn sign_up(state: &HttpState, username: &str) -> (String, String) {
    let register = actix_test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(registration(username))
        .to_request();
    let (status, created) = send(state, register).await;
    assert_eq!(status, 201, "registration failed: {created}");

    let login = actix_test::TestRequest::post()
        .uri("/api/v1/auth/token")
        .set_json(json!({ "email": format!("{username}@example.com"), "password": PASSWORD }))
        .to_request();
    let (status, issued) = send(state, login).await;
    assert_eq!(status, 200, "login failed: {issued}");

    (
        created["id"].as_str().expect("user id").to_owned(),
        issued["access_token"]
            .as_str()
            .expect("access token")
            .to_owned(),
    )
}
