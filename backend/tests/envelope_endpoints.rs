//! End-to-end behaviour of the envelope across the appointment endpoints.
//!
//! Requests run through the full middleware stack (`Trace` outermost, then
//! `UnhandledFailure`) with deterministic outcomes and a frozen clock.

use actix_web::http::{StatusCode, header};
use actix_web::test::{TestRequest, init_service};
use actix_web::{App, HttpResponse, web};
use appointment_api::domain::ports::Outcome;
use appointment_api::inbound::http;
use appointment_api::middleware::{Trace, UnhandledFailure};
use appointment_api::test_support::{http_state, send, test_app};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

#[fixture]
fn outcome() -> Outcome {
    Outcome::Proceed
}

async fn request(outcome: Outcome, req: TestRequest) -> (StatusCode, Option<String>, Value) {
    let app = init_service(test_app(http_state(outcome))).await;
    let reply = send(&app, req.to_request()).await;
    let body = reply.json();
    (reply.status, reply.trace_id, body)
}

#[rstest]
#[actix_web::test]
async fn success_envelope_has_data_and_no_error(outcome: Outcome) {
    let (status, _, body) = request(outcome, TestRequest::get().uri("/appointment/3")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isSuccess"], true);
    assert!(body.get("error").is_none());
    assert_eq!(body["data"]["id"], 3);
    assert!(body["meta"]["timestamp"].is_string());
}

#[rstest]
#[actix_web::test]
async fn meta_continues_the_callers_trace(outcome: Outcome) {
    let (_, header, body) = request(
        outcome,
        TestRequest::get()
            .uri("/appointment/1")
            .insert_header(("traceparent", TRACEPARENT)),
    )
    .await;

    assert_eq!(header.as_deref(), Some("4bf92f3577b34da6a3ce929d0e0e4736"));
    assert_eq!(body["meta"]["traceId"], "4bf92f3577b34da6a3ce929d0e0e4736");
    assert_ne!(body["meta"]["spanId"], "00f067aa0ba902b7");
}

#[rstest]
#[actix_web::test]
async fn not_found_echoes_the_requested_id(outcome: Outcome) {
    let (status, header, body) =
        request(outcome, TestRequest::get().uri("/appointment/9999")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["isSuccess"], false);
    assert!(body.get("data").is_none());
    assert_eq!(body["error"]["errorCode"], "EntityDoesNotExist");
    assert_eq!(body["error"]["errors"], json!({ "id": 9999 }));
    assert_eq!(body["meta"]["traceId"].as_str(), header.as_deref());
    let id = body["error"]["id"].as_str().expect("error id");
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[rstest]
#[actix_web::test]
async fn validation_reports_every_failing_field(outcome: Outcome) {
    let (status, _, body) = request(
        outcome,
        TestRequest::post()
            .uri("/appointment")
            .set_json(json!({ "date": "2020-01-01T00:00:00Z", "customerName": "  " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["errorCode"], "ValidationFailed");
    assert_eq!(
        body["error"]["message"],
        "One or more validation errors occurred."
    );
    assert_eq!(
        body["error"]["errors"],
        json!([
            { "field": "customerName", "message": "Customer name is required." },
            { "field": "date", "message": "Appointment date must be in the future." }
        ])
    );
}

#[rstest]
#[actix_web::test]
async fn malformed_json_is_a_validation_failure(outcome: Outcome) {
    let (status, _, body) = request(
        outcome,
        TestRequest::post()
            .uri("/appointment")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["errorCode"], "ValidationFailed");
    let errors = body["error"]["errors"].as_array().expect("errors array");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].get("field").is_none());
}

#[rstest]
#[case(TestRequest::get().uri("/appointment"), "Failed to fetch one of the appointments from the database.")]
#[case(
    TestRequest::post()
        .uri("/appointment")
        .set_json(json!({ "date": "2030-01-01T10:00:00Z", "customerName": "Ada" })),
    "Failed to create appointment in the database."
)]
#[actix_web::test]
async fn simulated_failures_are_database_errors(#[case] req: TestRequest, #[case] message: &str) {
    let (status, _, body) = request(Outcome::Fail, req).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["isSuccess"], false);
    assert_eq!(body["error"]["errorCode"], "DatabaseError");
    assert_eq!(body["error"]["message"], message);
    assert!(body["error"].get("exception").is_none());
}

#[rstest]
#[actix_web::test]
async fn list_reports_page_totals(outcome: Outcome) {
    let (status, _, body) =
        request(outcome, TestRequest::get().uri("/appointment?page=5&pageSize=5")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["data"][0]["id"], 21);
    assert_eq!(body["meta"]["page"]["totalPages"], 5);
}

#[rstest]
#[actix_web::test]
async fn page_past_the_end_is_empty(outcome: Outcome) {
    let (status, _, body) =
        request(outcome, TestRequest::get().uri("/appointment?page=9&pageSize=5")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["page"]["page"], 9);
}

async fn out_of_memory() -> HttpResponse {
    panic!("simulated allocator failure");
}

#[rstest]
#[actix_web::test]
async fn every_terminal_state_survives_the_full_stack(outcome: Outcome) {
    let app = init_service(
        App::new()
            .app_data(web::Data::new(http_state(outcome)))
            .wrap(UnhandledFailure::new(false))
            .wrap(Trace)
            .configure(http::configure)
            .route("/explode", web::get().to(out_of_memory)),
    )
    .await;

    let created = send(
        &app,
        TestRequest::post()
            .uri("/appointment")
            .set_json(json!({ "date": "2030-01-01T10:00:00Z", "customerName": "Ada" }))
            .to_request(),
    )
    .await;
    assert_eq!(created.status, StatusCode::OK);

    let rejected = send(
        &app,
        TestRequest::post()
            .uri("/appointment")
            .set_json(json!({ "date": "2030-01-01T10:00:00Z" }))
            .to_request(),
    )
    .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected.json()["error"]["errorCode"], "ValidationFailed");

    let missing = send(&app, TestRequest::get().uri("/appointment/9999").to_request()).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.json()["error"]["errorCode"], "EntityDoesNotExist");

    let exploded = send(&app, TestRequest::get().uri("/explode").to_request()).await;
    assert_eq!(exploded.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = exploded.json();
    assert_eq!(body["error"]["errorCode"], "Unknown");
    assert_eq!(body["error"]["message"], "An unexpected error occurred.");
    assert!(body["error"].get("exception").is_none());
    assert_eq!(body["meta"]["traceId"].as_str(), exploded.trace_id.as_deref());
}
