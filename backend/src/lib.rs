//! Appointment API library modules.
//!
//! The domain layer owns the response envelope, the error taxonomy and the
//! demo appointment use-cases; the inbound HTTP adapter and middleware map
//! them onto actix-web.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
