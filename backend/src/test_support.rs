//! Test utilities for the appointment API.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`). Only
//! compiled for tests or with the `test-support` feature.

use std::sync::Arc;

use actix_web::body::{BoxBody, EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::web::Bytes;
use actix_web::{App, test as actix_test, web};
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use serde_json::Value;

use crate::domain::{AppointmentService, TRACE_ID_HEADER};
use crate::domain::ports::{FixedOutcome, Outcome, SequentialAppointmentIds};
use crate::inbound::http::{self, state::HttpState};
use crate::middleware::{Trace, UnhandledFailure};

/// Identifier assigned to the first appointment created in tests.
pub const FIRST_CREATED_ID: i32 = 101;

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl FixtureClock {
    /// Freeze the clock at `utc_now`.
    pub fn at(utc_now: DateTime<Utc>) -> Self {
        Self { utc_now }
    }
}

impl Default for FixtureClock {
    fn default() -> Self {
        Self::at(
            Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
                .single()
                .unwrap_or_default(),
        )
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// HTTP state whose demo outcomes are forced to `outcome`.
pub fn http_state(outcome: Outcome) -> HttpState {
    let clock: Arc<dyn Clock> = Arc::new(FixtureClock::default());
    HttpState::new(AppointmentService::new(
        Arc::new(FixedOutcome(outcome)),
        Arc::new(SequentialAppointmentIds::starting_at(FIRST_CREATED_ID)),
        clock,
    ))
}

/// Fully wired application with both middlewares and diagnostics enabled.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(UnhandledFailure::new(true))
        .wrap(Trace)
        .configure(http::configure)
}

/// What a client would receive for one request.
#[derive(Debug)]
pub struct Reply {
    /// Response status.
    pub status: StatusCode,
    /// Value of the `trace-id` header.
    pub trace_id: Option<String>,
    /// Value of the `Content-Type` header.
    pub content_type: Option<String>,
    /// Raw body.
    pub body: Bytes,
}

impl Reply {
    /// Body parsed as JSON; `Value::Null` when it is not JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_default()
    }
}

fn header_text(headers: &header::HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Call `app` and render the outcome the way the HTTP server would.
///
/// A service error is turned into its response, as the server does for
/// errors escaping the outermost middleware.
pub async fn send<S, R, B>(app: &S, req: R) -> Reply
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody + 'static,
{
    let response = match actix_test::try_call_service(app, req).await {
        Ok(res) => res.into_parts().1.map_into_boxed_body(),
        Err(err) => err.error_response(),
    };
    let status = response.status();
    let trace_id = header_text(response.headers(), TRACE_ID_HEADER);
    let content_type = header_text(response.headers(), header::CONTENT_TYPE.as_str());
    let body = actix_web::body::to_bytes(response.into_body())
        .await
        .unwrap_or_default();
    Reply {
        status,
        trace_id,
        content_type,
        body,
    }
}
