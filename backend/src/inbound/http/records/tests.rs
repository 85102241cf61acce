//! Handler tests for the record creation endpoints.

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::Trace;
use crate::domain::ports::{
    DocumentStoreError, MockRecordWriter, RecordWriter, RelationalStoreError,
};
use crate::domain::{WriteError, WriteFailure, WriteOutcome};
use crate::inbound::http::configure;

async fn send(writer: impl RecordWriter + 'static, request: actix_test::TestRequest) -> ServiceResponse {
    let writer: Arc<dyn RecordWriter> = Arc::new(writer);
    let app = actix_test::init_service(
        App::new()
            .wrap(Trace)
            .app_data(web::Data::new(HttpState::new(writer)))
            .configure(configure),
    )
    .await;
    actix_test::call_service(&app, request.to_request()).await
}

fn post_json(uri: &str, body: Value) -> actix_test::TestRequest {
    actix_test::TestRequest::post().uri(uri).set_json(body)
}

fn writer_never_called() -> MockRecordWriter {
    let mut writer = MockRecordWriter::new();
    writer.expect_write_user().never();
    writer.expect_write_product().never();
    writer
}

#[actix_web::test]
async fn create_user_returns_success_message() {
    let mut writer = MockRecordWriter::new();
    writer
        .expect_write_user()
        .withf(|user| user.name() == "A" && user.email() == "a@x.com")
        .times(1)
        .return_once(|_| Ok(WriteOutcome::both_written(RecordKind::User)));

    let res = send(
        writer,
        post_json("/users", json!({"name": "A", "email": "a@x.com", "password": "p"})),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(
        body,
        json!({"message": "User created successfully in MongoDB and PostgreSQL!"})
    );
}

#[actix_web::test]
async fn create_product_accepts_missing_description() {
    let mut writer = MockRecordWriter::new();
    writer
        .expect_write_product()
        .withf(|product| product.description().is_none() && product.price() == 19.5)
        .times(1)
        .return_once(|_| Ok(WriteOutcome::both_written(RecordKind::Product)));

    let res = send(writer, post_json("/products", json!({"name": "Lamp", "price": 19.5}))).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(
        body["message"],
        "Product created successfully in MongoDB and PostgreSQL!"
    );
}

#[rstest]
#[case::missing_field("/users", json!({"name": "A", "email": "a@x.com"}))]
#[case::wrong_type("/products", json!({"name": "Lamp", "price": "cheap"}))]
#[case::blank_name("/users", json!({"name": " ", "email": "a@x.com", "password": "p"}))]
#[case::bad_email("/users", json!({"name": "A", "email": "ax.com", "password": "p"}))]
#[actix_web::test]
async fn invalid_bodies_are_rejected_before_writing(#[case] uri: &str, #[case] body: Value) {
    let res = send(writer_never_called(), post_json(uri, body)).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
}

#[actix_web::test]
async fn unparseable_json_is_an_invalid_request() {
    let request = actix_test::TestRequest::post()
        .uri("/users")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json");

    let res = send(writer_never_called(), request).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["code"], "malformed_body");
}

#[rstest]
#[case::document(
    WriteFailure::Document(DocumentStoreError::connection("no primary")),
    "document",
    "failed"
)]
#[case::relational(
    WriteFailure::Relational(RelationalStoreError::query("relation \"users\" does not exist")),
    "relational",
    "partially_written"
)]
#[actix_web::test]
async fn store_failures_return_500_with_stage(
    #[case] failure: WriteFailure,
    #[case] stage: &str,
    #[case] state: &str,
) {
    let cause = failure.to_string();
    let mut writer = MockRecordWriter::new();
    writer
        .expect_write_user()
        .times(1)
        .return_once(move |_| Err(WriteError::new(RecordKind::User, failure)));

    let res = send(
        writer,
        post_json("/users", json!({"name": "A", "email": "a@x.com", "password": "p"})),
    )
    .await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let trace_header = res
        .headers()
        .get("trace-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "store_write_failed");
    assert!(body["message"].as_str().is_some_and(|m| m.contains(&cause)));
    assert_eq!(body["details"]["stage"], stage);
    assert_eq!(body["details"]["state"], state);
    assert_eq!(body["traceId"].as_str().map(str::to_owned), trace_header);
}
