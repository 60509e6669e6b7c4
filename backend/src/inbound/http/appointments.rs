//! Appointment API handlers.
//!
//! ```text
//! GET  /appointment?page=1&pageSize=5
//! GET  /appointment/42
//! POST /appointment {"date":"2030-01-01T10:00:00Z","customerName":"Ada"}
//! ```

use actix_web::{get, post, web};
use chrono::{DateTime, Utc};
use mockable::Clock;
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Appointment, AppointmentId, FieldErrors, MetaInfo, NewAppointment, ResponseEnvelope,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ValidateRequest, Validated};

/// Query string for `GET /appointment`.
///
/// Out-of-range values are clamped rather than rejected.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListAppointmentsQuery {
    /// One-based page number (values below 1 become 1).
    pub page: Option<i64>,
    /// Items per page (values below 1 become 5; above 100 become 100).
    pub page_size: Option<i64>,
}

/// Request body for `POST /appointment`.
///
/// Example JSON:
/// `{"date":"2030-01-01T10:00:00Z","customerName":"Ada"}`
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub date: Option<DateTime<Utc>>,
    pub customer_name: Option<String>,
}

impl ValidateRequest for CreateAppointmentRequest {
    type Valid = NewAppointment;

    fn validate(self, clock: &dyn Clock) -> Result<NewAppointment, FieldErrors> {
        NewAppointment::try_new(self.customer_name, self.date, clock.utc())
    }
}

/// List one page of appointments.
#[utoipa::path(
    get,
    path = "/appointment",
    params(ListAppointmentsQuery),
    responses(
        (status = 200, description = "Page of appointments", body = ResponseEnvelope<Vec<Appointment>>),
        (status = 400, description = "Malformed query string", body = ResponseEnvelope<Vec<Appointment>>),
        (status = 500, description = "Simulated database failure", body = ResponseEnvelope<Vec<Appointment>>)
    ),
    tags = ["appointments"],
    operation_id = "listAppointments"
)]
#[get("/appointment")]
pub async fn list_appointments(
    state: web::Data<HttpState>,
    query: web::Query<ListAppointmentsQuery>,
) -> ResponseEnvelope<Vec<Appointment>> {
    let ListAppointmentsQuery { page, page_size } = query.into_inner();
    match state
        .appointments()
        .list(PageRequest::clamped(page, page_size))
    {
        Ok(listing) => ResponseEnvelope::success_with_meta(
            listing.items,
            MetaInfo::now().with_page(listing.meta),
        ),
        Err(error) => ResponseEnvelope::failure(error),
    }
}

/// Fetch a single appointment.
#[utoipa::path(
    get,
    path = "/appointment/{id}",
    params(("id" = i32, Path, description = "Appointment identifier")),
    responses(
        (status = 200, description = "Appointment", body = ResponseEnvelope<Appointment>),
        (status = 400, description = "Identifier is not an integer", body = ResponseEnvelope<Appointment>),
        (status = 404, description = "No appointment with this identifier", body = ResponseEnvelope<Appointment>)
    ),
    tags = ["appointments"],
    operation_id = "getAppointment"
)]
#[get("/appointment/{id}")]
pub async fn get_appointment(
    state: web::Data<HttpState>,
    id: web::Path<AppointmentId>,
) -> ResponseEnvelope<Appointment> {
    ResponseEnvelope::from_result(state.appointments().get(id.into_inner()))
}

/// Book an appointment.
#[utoipa::path(
    post,
    path = "/appointment",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 200, description = "Created appointment", body = ResponseEnvelope<Appointment>),
        (status = 400, description = "Validation failed", body = ResponseEnvelope<Appointment>),
        (status = 500, description = "Simulated database failure", body = ResponseEnvelope<Appointment>)
    ),
    tags = ["appointments"],
    operation_id = "createAppointment"
)]
#[post("/appointment")]
pub async fn create_appointment(
    state: web::Data<HttpState>,
    body: Validated<CreateAppointmentRequest>,
) -> ResponseEnvelope<Appointment> {
    ResponseEnvelope::from_result(state.appointments().create(body.into_inner()))
}

#[cfg(test)]
mod tests {
    //! Handler behaviour through the full middleware stack.

    use crate::domain::ports::Outcome;
    use crate::test_support::{FIRST_CREATED_ID, http_state, send, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn request(outcome: Outcome, req: actix_test::TestRequest) -> (StatusCode, Value) {
        let app = actix_test::init_service(test_app(http_state(outcome))).await;
        let reply = send(&app, req.to_request()).await;
        (reply.status, reply.json())
    }

    #[rstest]
    #[case("/appointment?page=1&pageSize=5", 1, 5, 5)]
    #[case("/appointment?page=0&pageSize=0", 1, 5, 5)]
    #[case("/appointment?page=-4&pageSize=500", 1, 100, 1)]
    #[case("/appointment?page=3&pageSize=10", 3, 10, 3)]
    #[actix_web::test]
    async fn list_clamps_and_paginates(
        #[case] uri: &str,
        #[case] page: u32,
        #[case] page_size: u32,
        #[case] total_pages: u64,
    ) {
        let (status, body) =
            request(Outcome::Proceed, actix_test::TestRequest::get().uri(uri)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isSuccess"], true);
        assert_eq!(
            body["meta"]["page"],
            json!({
                "page": page,
                "pageSize": page_size,
                "totalItems": 25,
                "totalPages": total_pages
            })
        );
    }

    #[actix_web::test]
    async fn list_failure_is_mapped_to_500() {
        let (status, body) = request(
            Outcome::Fail,
            actix_test::TestRequest::get().uri("/appointment"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["errorCode"], "DatabaseError");
        assert!(body["error"].get("exception").is_none());
        assert!(body.get("data").is_none());
    }

    #[actix_web::test]
    async fn missing_appointment_is_404() {
        let (status, body) = request(
            Outcome::Proceed,
            actix_test::TestRequest::get().uri("/appointment/9999"),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["isSuccess"], false);
        assert_eq!(body["error"]["errorCode"], "EntityDoesNotExist");
        assert_eq!(body["error"]["message"], "Appointment not found.");
        assert_eq!(body["error"]["errors"], json!({ "id": 9999 }));
    }

    #[actix_web::test]
    async fn non_numeric_id_is_invalid_data() {
        let (status, body) = request(
            Outcome::Proceed,
            actix_test::TestRequest::get().uri("/appointment/abc"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["errorCode"], "InvalidData");
    }

    #[actix_web::test]
    async fn existing_appointment_is_returned() {
        let (status, body) = request(
            Outcome::Proceed,
            actix_test::TestRequest::get().uri("/appointment/7"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], 7);
        assert_eq!(body["data"]["customerName"], "Customer 7");
    }

    #[actix_web::test]
    async fn create_rejects_missing_name_before_handler() {
        let (status, body) = request(
            Outcome::Fail,
            actix_test::TestRequest::post()
                .uri("/appointment")
                .set_json(json!({ "date": "2030-01-01T10:00:00Z" })),
        )
        .await;

        // A forced failure would have produced a 500 had the handler run.
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["errorCode"], "ValidationFailed");
        assert_eq!(
            body["error"]["errors"],
            json!([{ "field": "customerName", "message": "Customer name is required." }])
        );
    }

    #[actix_web::test]
    async fn create_returns_new_appointment() {
        let (status, body) = request(
            Outcome::Proceed,
            actix_test::TestRequest::post()
                .uri("/appointment")
                .set_json(json!({ "date": "2030-01-01T10:00:00Z", "customerName": "Ada" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], FIRST_CREATED_ID);
        assert_eq!(body["data"]["customerName"], "Ada");
        assert!(body["meta"]["traceId"].is_string());
        assert!(body["meta"]["spanId"].is_string());
    }

    #[actix_web::test]
    async fn create_failure_is_database_error() {
        let (status, body) = request(
            Outcome::Fail,
            actix_test::TestRequest::post()
                .uri("/appointment")
                .set_json(json!({ "date": "2030-01-01T10:00:00Z", "customerName": "Ada" })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"]["message"],
            "Failed to create appointment in the database."
        );
    }
}
