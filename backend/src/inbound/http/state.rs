//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on the [`RecordWriter`] port and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::RecordWriter;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub writer: Arc<dyn RecordWriter>,
}

impl HttpState {
    /// Build state around a record writer.
    pub fn new(writer: Arc<dyn RecordWriter>) -> Self {
        Self { writer }
    }
}
