//! Dual-write record service.
//!
//! Records are written to a MongoDB document store and then a PostgreSQL
//! relational store. At startup the relational schema is ensured and existing
//! documents are back-filled into the relational store.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod startup;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
