//! Domain primitives, the response envelope and the demo use-cases.
//!
//! Purpose: keep the envelope contract transport agnostic. The HTTP adapter
//! decides status codes; everything here is plain data and pure functions.
//!
//! Public surface:
//! - ErrorCode / ErrorResponse / ExceptionDetails: the failure taxonomy and
//!   payload.
//! - ValidationError / FieldErrors: field-level validation failures.
//! - ResponseEnvelope / MetaInfo: the uniform wrapper and its metadata.
//! - TraceContext: request-scoped trace and span identifiers.
//! - Fault: unexpected failures caught at the outermost boundary.
//! - Appointment / AppointmentService: the demo domain.

pub mod appointment;
pub mod appointment_service;
pub mod envelope;
pub mod error;
pub mod fault;
pub mod ports;
pub mod trace_context;
pub mod validation;

pub use self::appointment::{
    Appointment, AppointmentId, NewAppointment, generate_appointments,
};
pub use self::appointment_service::{AppointmentPage, AppointmentService};
pub use self::envelope::{EnvelopeShapeError, MetaInfo, ResponseEnvelope};
pub use self::error::{ErrorCode, ErrorResponse, ExceptionDetails};
pub use self::fault::Fault;
pub use self::trace_context::{SpanId, TraceContext, TraceId};
pub use self::validation::{FieldErrors, ValidationError};

/// Header carrying the trace identifier on every response.
pub const TRACE_ID_HEADER: &str = "trace-id";
