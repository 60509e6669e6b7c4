//! Reject-early request validation for inbound HTTP adapters.
//!
//! [`Validated`] decodes a JSON body and runs [`ValidateRequest`] before the
//! handler is called. A failure short-circuits with a 400 `ValidationFailed`
//! envelope, so the handler never runs. The extractor configs below give
//! malformed bodies, query strings and path segments the same envelope shape.

use std::marker::PhantomData;
use std::sync::Arc;

use actix_web::dev::Payload;
use actix_web::error::{InternalError, JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;
use mockable::{Clock, DefaultClock};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{ErrorCode, ErrorResponse, FieldErrors, ResponseEnvelope};
use crate::inbound::http::state::HttpState;

/// Request body that can be checked and converted into a domain command.
pub trait ValidateRequest: DeserializeOwned {
    /// Validated form handed to the handler.
    type Valid;

    /// Check every rule, reporting all failing fields at once.
    fn validate(self, clock: &dyn Clock) -> Result<Self::Valid, FieldErrors>;
}

/// Extractor yielding a validated request body.
///
/// # Examples
/// ```
/// use actix_web::{post, HttpResponse};
/// use appointment_api::inbound::http::Validated;
/// use appointment_api::inbound::http::appointments::CreateAppointmentRequest;
///
/// #[post("/appointment")]
/// async fn create(body: Validated<CreateAppointmentRequest>) -> HttpResponse {
///     let _draft = body.into_inner();
///     HttpResponse::Ok().finish()
/// }
/// ```
pub struct Validated<T: ValidateRequest> {
    valid: T::Valid,
    _request: PhantomData<T>,
}

impl<T: ValidateRequest> Validated<T> {
    /// Take the validated value.
    pub fn into_inner(self) -> T::Valid {
        self.valid
    }
}

impl<T> FromRequest for Validated<T>
where
    T: ValidateRequest + 'static,
    T::Valid: 'static,
{
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = web::Json::<T>::from_request(req, payload);
        let clock: Arc<dyn Clock> = req
            .app_data::<web::Data<HttpState>>()
            .map(|state| Arc::clone(state.clock()))
            .unwrap_or_else(|| Arc::new(DefaultClock));
        Box::pin(async move {
            let web::Json(request) = body.await?;
            match request.validate(clock.as_ref()) {
                Ok(valid) => Ok(Self {
                    valid,
                    _request: PhantomData,
                }),
                Err(errors) => Err(reject(ErrorCode::ValidationFailed, &errors)),
            }
        })
    }
}

/// Convert field failures into an error whose response is the 400 envelope.
pub fn reject(code: ErrorCode, errors: &FieldErrors) -> actix_web::Error {
    let error = ErrorResponse::from_field_errors(code, errors);
    let summary = error.message().to_owned();
    let response = ResponseEnvelope::<()>::failure(error).into_http_response();
    InternalError::from_response(summary, response).into()
}

fn unattributed(message: impl Into<String>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.add_unattributed(message);
    errors
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejecting malformed JSON body");
    reject(ErrorCode::ValidationFailed, &unattributed(err.to_string()))
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejecting malformed query string");
    reject(ErrorCode::ValidationFailed, &unattributed(err.to_string()))
}

fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejecting malformed path segment");
    reject(ErrorCode::InvalidData, &unattributed(err.to_string()))
}

/// JSON body config producing validation envelopes.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

/// Query string config producing validation envelopes.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error_handler)
}

/// Path config producing `InvalidData` envelopes.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(path_error_handler)
}
