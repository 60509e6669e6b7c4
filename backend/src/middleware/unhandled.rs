//! Outermost guard turning escaped faults into a uniform 500 envelope.
//!
//! Three kinds of failure are intercepted:
//! - a handler panic, caught with `catch_unwind`;
//! - an `actix_web::Error` returned by the inner service with a 5xx status;
//! - a response carrying such an error, which is how actix delivers handler
//!   errors to middleware.
//!
//! Client errors (4xx) and responses without an attached error pass through
//! untouched; those are already envelopes. A [`Fault::Cancelled`] becomes
//! `499 Client Closed Request` with an empty body and is logged at `info`.
//!
//! The request cannot be cloned before routing (actix needs unique ownership
//! to record path parameters), so panics and inner errors are answered with an
//! [`InternalError`] carrying the rendered envelope rather than a
//! `ServiceResponse`.
//!
//! Wrap this middleware *inside* [`Trace`](crate::middleware::Trace) so the
//! trace context is recorded on the request before it arrives here.

use std::panic::{self, AssertUnwindSafe};
use std::task::{Context, Poll};

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::InternalError;
use actix_web::http::header::ContentType;
use actix_web::{Error, HttpMessage, HttpResponse};
use chrono::{SecondsFormat, Utc};
use futures_util::FutureExt;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::fault::capture_panic_backtraces;
use crate::domain::{
    ErrorCode, ErrorResponse, Fault, MetaInfo, ResponseEnvelope, TRACE_ID_HEADER, TraceContext,
    TraceId,
};
use crate::inbound::http::envelope::UNEXPECTED_ERROR_MESSAGE;
use crate::inbound::http::error::client_closed_request;

/// Middleware converting unexpected failures into failure envelopes.
///
/// `expose_diagnostics` controls whether the `exception` block (message,
/// inner cause and stack trace) is included in the response body.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use appointment_api::middleware::UnhandledFailure;
/// use appointment_api::Trace;
///
/// let _app = App::new().wrap(UnhandledFailure::new(false)).wrap(Trace);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct UnhandledFailure {
    expose_diagnostics: bool,
}

impl UnhandledFailure {
    /// Build the middleware with the given diagnostics policy.
    pub const fn new(expose_diagnostics: bool) -> Self {
        Self { expose_diagnostics }
    }
}

impl<S, B> Transform<S, ServiceRequest> for UnhandledFailure
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = UnhandledFailureMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        capture_panic_backtraces();
        ready(Ok(UnhandledFailureMiddleware {
            service,
            expose_diagnostics: self.expose_diagnostics,
        }))
    }
}

/// Service wrapper produced by [`UnhandledFailure`].
pub struct UnhandledFailureMiddleware<S> {
    service: S,
    expose_diagnostics: bool,
}

impl<S, B> Service<ServiceRequest> for UnhandledFailureMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let expose_diagnostics = self.expose_diagnostics;
        let context = req
            .extensions()
            .get::<TraceContext>()
            .copied()
            .or_else(TraceContext::current);
        let started = panic::catch_unwind(AssertUnwindSafe(|| self.service.call(req)));

        Box::pin(async move {
            let outcome = match started {
                Ok(fut) => AssertUnwindSafe(fut).catch_unwind().await,
                Err(payload) => Err(payload),
            };
            match outcome {
                Ok(Ok(res)) => match response_fault(&res) {
                    None => Ok(res.map_into_left_body()),
                    Some(fault) => {
                        let (request, _) = res.into_parts();
                        let response = render(&fault, context.as_ref(), expose_diagnostics);
                        Ok(ServiceResponse::new(request, response).map_into_right_body())
                    }
                },
                Ok(Err(err)) => match error_fault(&err) {
                    None => Err(err),
                    Some(fault) => Err(escalate(fault, context.as_ref(), expose_diagnostics)),
                },
                Err(payload) => Err(escalate(
                    Fault::from_panic(payload.as_ref()),
                    context.as_ref(),
                    expose_diagnostics,
                )),
            }
        })
    }
}

/// The fault behind a response, or `None` when it should pass through.
fn response_fault<B>(res: &ServiceResponse<B>) -> Option<Fault> {
    let err = res.response().error()?;
    match err.as_error::<Fault>() {
        Some(fault) => Some(fault.clone()),
        None => res
            .status()
            .is_server_error()
            .then(|| Fault::from_error(err)),
    }
}

/// The fault behind an error returned by the inner service.
fn error_fault(err: &Error) -> Option<Fault> {
    match err.as_error::<Fault>() {
        Some(fault) => Some(fault.clone()),
        None => err
            .as_response_error()
            .status_code()
            .is_server_error()
            .then(|| Fault::from_error(err)),
    }
}

fn escalate(fault: Fault, context: Option<&TraceContext>, expose_diagnostics: bool) -> Error {
    let response = render(&fault, context, expose_diagnostics);
    InternalError::from_response(fault, response).into()
}

/// Minimal failure envelope used when the real one cannot be serialized.
///
/// Built by formatting alone so it cannot fail.
pub fn fallback_body(trace_id: &str) -> String {
    format!(
        r#"{{"isSuccess":false,"error":{{"id":"{id}","message":"{UNEXPECTED_ERROR_MESSAGE}","errorCode":"Unknown"}},"meta":{{"traceId":"{trace_id}","timestamp":"{timestamp}"}}}}"#,
        id = Uuid::new_v4(),
        timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    )
}

fn render(fault: &Fault, context: Option<&TraceContext>, expose_diagnostics: bool) -> HttpResponse {
    let trace_id = context.map_or_else(TraceId::generate, TraceContext::trace_id).to_string();

    let Fault::Unhandled { message, details, .. } = fault else {
        info!(trace_id = %trace_id, "request cancelled by the client");
        return HttpResponse::build(client_closed_request())
            .insert_header((TRACE_ID_HEADER, trace_id))
            .finish();
    };
    error!(
        trace_id = %trace_id,
        error = %message,
        details = details.as_deref().unwrap_or_default(),
        "An unhandled exception has occurred."
    );

    let mut error = ErrorResponse::new(ErrorCode::Unknown, UNEXPECTED_ERROR_MESSAGE);
    if expose_diagnostics {
        if let Some(exception) = fault.diagnostics() {
            error = error.with_exception(exception);
        }
    }
    let meta = MetaInfo::fresh(context).with_trace_id(trace_id.as_str());
    let envelope = ResponseEnvelope::<()>::failure_with_meta(error, meta);

    let body = serde_json::to_string(&envelope).unwrap_or_else(|err| {
        error!(error = %err, "failed to serialize failure envelope");
        fallback_body(&trace_id)
    });
    HttpResponse::InternalServerError()
        .content_type(ContentType::json())
        .insert_header((TRACE_ID_HEADER, trace_id))
        .body(body)
}
