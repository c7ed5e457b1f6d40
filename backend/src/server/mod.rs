//! Server construction and middleware wiring.

mod config;
mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use settings::AppSettings;

use state_builders::{BuiltState, build_state};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use backpacker_connect::Trace;
#[cfg(debug_assertions)]
use backpacker_connect::doc::ApiDoc;
use backpacker_connect::inbound::http::api_scope;
use backpacker_connect::inbound::http::health::{HealthState, live, ready};
use backpacker_connect::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api_scope())
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Build handler state and health state; readiness depends on the configured
/// store answering.
pub fn build_states(config: &ServerConfig) -> (web::Data<HealthState>, web::Data<HttpState>) {
    let BuiltState {
        http_state,
        store_health,
    } = build_state(config);
    (
        web::Data::new(HealthState::new().with_store(store_health)),
        web::Data::new(http_state),
    )
}

/// Construct an Actix HTTP server from prepared state and configuration.
///
/// Readiness is marked once the listener is bound. Signal handling is left
/// to the caller so liveness can be failed before the server drains.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    config: &ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .disable_signals()
    .bind(config.bind_addr())?
    .run();

    health_state.mark_ready();
    Ok(server)
}
