//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the appointment endpoints together with the envelope,
//! error and pagination schemas they return. The document backs Swagger UI in
//! debug builds and is exported via `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use crate::domain::{Appointment, ErrorCode, ErrorResponse, ExceptionDetails, MetaInfo};
use crate::inbound::http::appointments::CreateAppointmentRequest;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Appointment API",
        description = "Appointment endpoints answering with a uniform success/failure envelope."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::appointments::list_appointments,
        crate::inbound::http::appointments::get_appointment,
        crate::inbound::http::appointments::create_appointment,
    ),
    components(schemas(
        Appointment,
        CreateAppointmentRequest,
        ErrorCode,
        ErrorResponse,
        ExceptionDetails,
        MetaInfo,
        pagination::PageMeta,
    )),
    tags(
        (name = "appointments", description = "Demo appointment booking")
    )
)]
pub struct ApiDoc;
