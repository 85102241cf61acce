//! Shared helpers for integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`; this
//! module is the common home for app and fixture builders.
#![allow(dead_code, reason = "each test crate uses a different subset")]

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::{App, test, web};
use dualwrite::Trace;
use dualwrite::domain::ports::RecordWriter;
use dualwrite::domain::{DualWriteCoordinator, Product, User};
use dualwrite::inbound::http::configure;
use dualwrite::inbound::http::state::HttpState;
use dualwrite::test_support::{InMemoryDocumentStore, InMemoryRelationalStore};
use serde_json::Value;

/// In-memory stores plus the coordinator writing to them.
pub struct Stores {
    pub documents: Arc<InMemoryDocumentStore>,
    pub relational: Arc<InMemoryRelationalStore>,
}

impl Stores {
    pub fn empty() -> Self {
        Self {
            documents: Arc::new(InMemoryDocumentStore::new()),
            relational: Arc::new(InMemoryRelationalStore::new()),
        }
    }

    pub fn writer(&self) -> Arc<dyn RecordWriter> {
        Arc::new(DualWriteCoordinator::new(
            Arc::clone(&self.documents),
            Arc::clone(&self.relational),
        ))
    }
}

/// POST `body` as JSON to `uri` on a fresh app over `writer`.
///
/// The app holds no state of its own, so building one per request still
/// shares the stores behind `writer`.
pub async fn post_json(writer: Arc<dyn RecordWriter>, uri: &str, body: Value) -> ServiceResponse {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(HttpState::new(writer)))
            .wrap(Trace)
            .configure(configure),
    )
    .await;
    let request = test::TestRequest::post().uri(uri).set_json(body).to_request();
    test::call_service(&app, request).await
}

pub fn user(name: &str, email: &str) -> User {
    User::try_new(name, email, "p").expect("valid user")
}

pub fn product(name: &str, price: f64) -> Product {
    Product::try_new(name, price, None).expect("valid product")
}
