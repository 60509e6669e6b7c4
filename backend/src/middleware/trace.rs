//! Tracing middleware establishing the request-scoped [`TraceContext`].
//!
//! The context continues a W3C `traceparent` header when one is present and
//! valid, otherwise it starts a new trace. It is stored in the request
//! extensions and in task-local storage so envelopes built anywhere in the
//! request pick up the same identifiers.
//!
//! Tokio task-local variables are not inherited across spawned tasks. Use
//! [`TraceContext::scope`] when spawning new tasks or moving work onto
//! blocking threads.

use std::task::{Context, Poll};

use actix_web::{Error, HttpMessage};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, error, info_span};

use crate::domain::{TRACE_ID_HEADER, TraceContext};

/// Inbound header continuing a distributed trace.
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Tracing middleware attaching a [`TraceContext`] and adding a `trace-id`
/// header to every response.
///
/// Handlers can read the context via [`TraceContext::current`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use appointment_api::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service wrapper produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

fn context_for(req: &ServiceRequest) -> TraceContext {
    req.headers()
        .get(TRACEPARENT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(TraceContext::from_traceparent)
        .unwrap_or_else(TraceContext::generate)
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let context = context_for(&req);
        req.extensions_mut().insert(context);
        let span = info_span!(
            "request",
            trace_id = %context.trace_id(),
            span_id = %context.span_id(),
            method = %req.method(),
            path = %req.path(),
        );
        let header_value = context.trace_id().to_string();
        let fut = self.service.call(req);
        Box::pin(TraceContext::scope(
            context,
            async move {
                let mut res = fut.await?;
                match HeaderValue::from_str(&header_value) {
                    Ok(value) => {
                        res.response_mut()
                            .headers_mut()
                            .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                    }
                    Err(error) => {
                        error!(%error, "failed to encode trace identifier header");
                    }
                }
                Ok(res)
            }
            .instrument(span),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpRequest, HttpResponse, test as actix_test, web};

    const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    async fn echo_context(req: HttpRequest) -> HttpResponse {
        let scoped = TraceContext::current().map(|context| context.trace_id().to_string());
        let stored = req
            .extensions()
            .get::<TraceContext>()
            .map(|context| context.trace_id().to_string());
        HttpResponse::Ok().json((scoped, stored))
    }

    async fn call(req: actix_test::TestRequest) -> (String, (Option<String>, Option<String>)) {
        let app = actix_test::init_service(
            App::new()
                .wrap(Trace)
                .route("/", web::get().to(echo_context)),
        )
        .await;
        let res = actix_test::call_service(&app, req.uri("/").to_request()).await;
        let header = res
            .headers()
            .get(TRACE_ID_HEADER)
            .expect("trace id header")
            .to_str()
            .expect("header is ascii")
            .to_owned();
        (header, actix_test::read_body_json(res).await)
    }

    #[actix_web::test]
    async fn generates_context_and_exposes_it_everywhere() {
        let (header, (scoped, stored)) = call(actix_test::TestRequest::get()).await;
        assert_eq!(header.len(), 32);
        assert_eq!(scoped.as_deref(), Some(header.as_str()));
        assert_eq!(stored.as_deref(), Some(header.as_str()));
    }

    #[actix_web::test]
    async fn continues_incoming_traceparent() {
        let (header, (scoped, _)) = call(
            actix_test::TestRequest::get().insert_header((TRACEPARENT_HEADER, TRACEPARENT)),
        )
        .await;
        assert_eq!(header, "4bf92f3577b34da6a3ce929d0e0e4736");
        assert_eq!(scoped.as_deref(), Some(header.as_str()));
    }

    #[actix_web::test]
    async fn ignores_malformed_traceparent() {
        let (header, _) = call(
            actix_test::TestRequest::get().insert_header((TRACEPARENT_HEADER, "not-a-traceparent")),
        )
        .await;
        assert_ne!(header, "not-a-traceparent");
        assert_eq!(header.len(), 32);
    }

    #[tokio::test]
    async fn context_is_absent_out_of_scope() {
        assert!(TraceContext::current().is_none());
    }
}
