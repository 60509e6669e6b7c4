//! HTTP inbound adapter exposing the appointment endpoints.
//!
//! Handlers never set status codes; they return a
//! [`ResponseEnvelope`](crate::domain::ResponseEnvelope) and the translator
//! in [`envelope`] picks the status.

pub mod appointments;
pub mod envelope;
pub mod error;
pub mod state;
pub mod validation;

use actix_web::web;

pub use error::status_for;
pub use validation::{ValidateRequest, Validated};

/// Register the appointment routes and the extractor error handlers.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use appointment_api::inbound::http::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(validation::json_config())
        .app_data(validation::query_config())
        .app_data(validation::path_config())
        .service(appointments::list_appointments)
        .service(appointments::get_appointment)
        .service(appointments::create_appointment);
}
