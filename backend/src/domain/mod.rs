//! Domain records, ports, and the dual-write and migration services.
//!
//! Purpose: hold everything that does not depend on a concrete store or on
//! HTTP. Adapters in `outbound` implement the driven ports; `inbound` drives
//! the [`ports::RecordWriter`] port.
//!
//! Public surface:
//! - `User`, `Product` — validated records written to both stores.
//! - `DualWriteCoordinator` — ordered document-then-relational writes.
//! - `BulkMigrator` — startup back-fill of the relational store.
//! - `Error`, `ErrorCode` — API error payload.

pub(crate) mod deadline;
pub mod dual_write;
pub mod error;
pub mod migration;
pub mod ports;
pub mod records;
pub mod trace_id;

pub use self::dual_write::{
    DualWriteCoordinator, WriteError, WriteFailure, WriteOutcome, WriteStage, WriteState,
};
pub use self::error::{Error, ErrorCode};
pub use self::migration::{
    BulkMigrator, KindReport, MigrationError, MigrationRecordError, MigrationReport,
    RecordFailure,
};
pub use self::records::{Password, Product, RecordKind, RecordValidationError, User};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use dualwrite::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::invalid_request("name must not be empty"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
