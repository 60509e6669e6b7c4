//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::body::{BoxBody, EitherBody};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
use tracing::info;

use appointment_api::Trace;
#[cfg(debug_assertions)]
use appointment_api::doc::ApiDoc;
use appointment_api::domain::AppointmentService;
use appointment_api::domain::ports::{
    FixedOutcome, Outcome, OutcomeStrategy, RandomAppointmentIds, RandomOutcomes,
};
use appointment_api::inbound::http::{self, state::HttpState};
use appointment_api::middleware::UnhandledFailure;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_http_state(config: &ServerConfig) -> HttpState {
    let outcomes: Arc<dyn OutcomeStrategy> = if config.simulate_failures {
        Arc::new(RandomOutcomes)
    } else {
        Arc::new(FixedOutcome(Outcome::Proceed))
    };
    HttpState::new(AppointmentService::new(
        outcomes,
        Arc::new(RandomAppointmentIds::default()),
        Arc::new(DefaultClock),
    ))
}

fn build_app(
    http_state: web::Data<HttpState>,
    expose_exception_details: bool,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(http_state)
        .wrap(UnhandledFailure::new(expose_exception_details))
        .wrap(Trace)
        .configure(http::configure);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server from the resolved configuration.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config));
    let ServerConfig {
        host,
        port,
        expose_exception_details,
        simulate_failures,
    } = config;

    let server = HttpServer::new(move || build_app(http_state.clone(), expose_exception_details))
        .bind((host.as_str(), port))?
        .run();

    info!(
        %host,
        port,
        expose_exception_details,
        simulate_failures,
        "appointment API listening"
    );
    Ok(server)
}
