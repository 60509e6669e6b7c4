//! HTTP adapter mapping for the error taxonomy.
//!
//! Purpose: keep [`ErrorCode`] HTTP-agnostic while giving every code exactly
//! one transport status.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use crate::domain::{ErrorCode, ErrorResponse, Fault, MetaInfo, ResponseEnvelope};
use crate::inbound::http::envelope::UNEXPECTED_ERROR_MESSAGE;

/// Non-standard status reported when the client abandoned the request.
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Transport status for a failure category.
///
/// Codes without a dedicated mapping are internal errors.
///
/// # Examples
/// ```
/// use actix_web::http::StatusCode;
/// use appointment_api::domain::ErrorCode;
/// use appointment_api::inbound::http::status_for;
///
/// assert_eq!(status_for(ErrorCode::EntityDoesNotExist), StatusCode::NOT_FOUND);
/// assert_eq!(status_for(ErrorCode::DatabaseError), StatusCode::INTERNAL_SERVER_ERROR);
/// ```
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed | ErrorCode::InvalidData => StatusCode::BAD_REQUEST,
        ErrorCode::InvalidPermission => StatusCode::FORBIDDEN,
        ErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,
        ErrorCode::EntityDoesNotExist => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Status used for client cancellation.
pub fn client_closed_request() -> StatusCode {
    StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::BAD_REQUEST)
}

impl ResponseError for Fault {
    fn status_code(&self) -> StatusCode {
        match self {
            Fault::Cancelled => client_closed_request(),
            Fault::Unhandled { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Without the interceptor there is no diagnostics gate, so never
        // expose internals here.
        match self {
            Fault::Cancelled => HttpResponse::build(self.status_code()).finish(),
            Fault::Unhandled { .. } => ResponseEnvelope::<()>::failure_with_meta(
                ErrorResponse::new(ErrorCode::Unknown, UNEXPECTED_ERROR_MESSAGE),
                MetaInfo::now(),
            )
            .into_http_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Exhaustiveness of the status mapping.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorCode::ValidationFailed, StatusCode::BAD_REQUEST)]
    #[case(ErrorCode::InvalidData, StatusCode::BAD_REQUEST)]
    #[case(ErrorCode::InvalidPermission, StatusCode::FORBIDDEN)]
    #[case(ErrorCode::InvalidToken, StatusCode::UNAUTHORIZED)]
    #[case(ErrorCode::EntityDoesNotExist, StatusCode::NOT_FOUND)]
    #[case(ErrorCode::Unknown, StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(ErrorCode::DatabaseError, StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(ErrorCode::EmailAlreadyTaken, StatusCode::INTERNAL_SERVER_ERROR)]
    fn maps_codes_to_statuses(#[case] code: ErrorCode, #[case] expected: StatusCode) {
        assert_eq!(status_for(code), expected);
    }

    #[rstest]
    fn every_code_maps_to_a_defined_error_status() {
        let allowed = [
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN,
            StatusCode::NOT_FOUND,
            StatusCode::INTERNAL_SERVER_ERROR,
        ];
        for code in ErrorCode::ALL {
            let status = status_for(code);
            assert!(allowed.contains(&status), "{code:?} mapped to {status}");
        }
    }

    #[rstest]
    fn fault_statuses() {
        assert_eq!(Fault::unhandled("x").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(Fault::Cancelled.status_code().as_u16(), CLIENT_CLOSED_REQUEST);
    }

    #[actix_web::test]
    async fn fault_response_hides_diagnostics() {
        let response = Fault::unhandled("secret path /etc/shadow").error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = actix_web::body::to_bytes(response.into_body())
            .await
            .expect("response body to bytes");
        let body: ResponseEnvelope<()> = serde_json::from_slice(&bytes).expect("envelope");
        let error = body.error().expect("error present");
        assert_eq!(error.error_code(), ErrorCode::Unknown);
        assert!(error.exception().is_none());
    }
}
