//! Envelope translator: the single place where a domain outcome becomes an
//! HTTP status.

use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder};
use serde::Serialize;

use crate::domain::ResponseEnvelope;
use crate::inbound::http::error::status_for;

/// Message carried by every intercepted fault.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

impl<T> ResponseEnvelope<T> {
    /// Status this envelope is sent with: 200 on success, otherwise the
    /// status mapped from the error code.
    pub fn status_code(&self) -> StatusCode {
        match self.error() {
            None => StatusCode::OK,
            Some(error) => status_for(error.error_code()),
        }
    }
}

impl<T: Serialize> ResponseEnvelope<T> {
    /// Serialise into a JSON response with the mapped status.
    pub fn into_http_response(self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

impl<T: Serialize> Responder for ResponseEnvelope<T> {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        self.into_http_response()
    }
}
