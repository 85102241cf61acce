//! Dual-write coordination.
//!
//! Each write goes to the document store first and then to the relational
//! store, sequentially and without a shared transaction:
//!
//! ```text
//! Pending -> DocumentWritten -> BothWritten        (success)
//! Pending -> DocumentWritten -> PartiallyWritten   (relational failure, no rollback)
//! Pending -> Failed                                (document failure, nothing written)
//! ```
//!
//! A partial write is permanent. The coordinator reports it through
//! [`WriteError`] and a `dual_write.partial` log event, and never retries or
//! compensates.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::ports::{
    DocumentStore, DocumentStoreError, InsertOutcome, RecordWriter, RelationalStore,
    RelationalStoreError,
};
use crate::domain::deadline::within_deadline;
use crate::domain::{Error, Product, RecordKind, User};

/// Store a write stage targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    /// The document store, written first.
    Document,
    /// The relational store, written second.
    Relational,
}

impl WriteStage {
    /// Stable lowercase label used in logs and error details.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Relational => "relational",
        }
    }
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of a single dual write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    /// Nothing written yet.
    Pending,
    /// The document store accepted the record.
    DocumentWritten,
    /// Both stores accepted the record.
    BothWritten,
    /// Only the document store holds the record.
    PartiallyWritten,
    /// The document store rejected the record; nothing was written.
    Failed,
}

impl WriteState {
    /// Stable snake_case label used in logs and error details.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::DocumentWritten => "document_written",
            Self::BothWritten => "both_written",
            Self::PartiallyWritten => "partially_written",
            Self::Failed => "failed",
        }
    }

    /// Whether no further transition can happen.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::BothWritten | Self::PartiallyWritten | Self::Failed)
    }
}

/// Successful dual write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    kind: RecordKind,
}

impl WriteOutcome {
    /// Outcome for a record now held by both stores.
    pub fn both_written(kind: RecordKind) -> Self {
        Self { kind }
    }

    /// Kind of record written.
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Terminal state; always [`WriteState::BothWritten`].
    pub fn state(&self) -> WriteState {
        WriteState::BothWritten
    }
}

/// Underlying reason a stage failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteFailure {
    /// The document store rejected the insert.
    #[error(transparent)]
    Document(#[from] DocumentStoreError),
    /// The relational store rejected the insert.
    #[error(transparent)]
    Relational(#[from] RelationalStoreError),
    /// The relational store already holds a user with this email.
    #[error("a user with this email already exists")]
    DuplicateEmail,
}

/// Failed dual write, tagged with the stage that failed.
///
/// A relational-stage failure means the document store still holds the
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteError {
    kind: RecordKind,
    cause: WriteFailure,
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to insert {} into the {} store: {}",
            self.kind,
            self.stage(),
            self.cause
        )
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

impl WriteError {
    /// Build an error for the given record kind.
    pub fn new(kind: RecordKind, cause: impl Into<WriteFailure>) -> Self {
        Self {
            kind,
            cause: cause.into(),
        }
    }

    /// Kind of record that was being written.
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Store that rejected the write.
    pub fn stage(&self) -> WriteStage {
        match self.cause {
            WriteFailure::Document(_) => WriteStage::Document,
            WriteFailure::Relational(_) | WriteFailure::DuplicateEmail => WriteStage::Relational,
        }
    }

    /// Terminal state the write was left in.
    pub fn state(&self) -> WriteState {
        match self.stage() {
            WriteStage::Document => WriteState::Failed,
            WriteStage::Relational => WriteState::PartiallyWritten,
        }
    }

    /// Reason the stage failed.
    pub fn cause(&self) -> &WriteFailure {
        &self.cause
    }
}

impl From<WriteError> for Error {
    fn from(value: WriteError) -> Self {
        let details = json!({
            "stage": value.stage().as_str(),
            "state": value.state().as_str(),
            "kind": value.kind().as_str(),
        });
        Error::store_write_failed(value.to_string()).with_details(details)
    }
}

/// Writes every record to the document store and then the relational store.
#[derive(Clone)]
pub struct DualWriteCoordinator<D, R> {
    documents: Arc<D>,
    relational: Arc<R>,
    store_call_timeout: Option<Duration>,
}

impl<D, R> DualWriteCoordinator<D, R> {
    /// Create a coordinator over the given store handles.
    pub fn new(documents: Arc<D>, relational: Arc<R>) -> Self {
        Self {
            documents,
            relational,
            store_call_timeout: None,
        }
    }

    /// Bound every individual store call by `timeout`.
    #[must_use]
    pub fn with_store_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.store_call_timeout = timeout;
        self
    }
}

impl<D, R> DualWriteCoordinator<D, R>
where
    D: DocumentStore,
    R: RelationalStore,
{
    /// Persist a user to both stores.
    ///
    /// # Errors
    ///
    /// Returns a document-stage [`WriteError`] when the document insert fails
    /// (the relational store is not attempted), or a relational-stage error
    /// when the relational insert fails or the email is already taken.
    pub async fn write_user(&self, user: User) -> Result<WriteOutcome, WriteError> {
        let kind = RecordKind::User;
        within_deadline(
            self.store_call_timeout,
            "insert user document",
            self.documents.insert_user(&user),
            |operation| DocumentStoreError::timeout(operation),
        )
        .await
        .map_err(|cause| document_stage_failed(kind, cause))?;
        debug!(%kind, state = WriteState::DocumentWritten.as_str(), "dual write progressed");

        let outcome = within_deadline(
            self.store_call_timeout,
            "insert user row",
            self.relational.insert_user(&user),
            |operation| RelationalStoreError::timeout(operation),
        )
        .await
        .map_err(|cause| relational_stage_failed(kind, user.email(), cause.into()))?;

        match outcome {
            InsertOutcome::Inserted => Ok(both_written(kind)),
            InsertOutcome::DuplicateSkipped => Err(relational_stage_failed(
                kind,
                user.email(),
                WriteFailure::DuplicateEmail,
            )),
        }
    }

    /// Persist a product to both stores.
    ///
    /// # Errors
    ///
    /// Returns a document-stage [`WriteError`] when the document insert fails
    /// (the relational store is not attempted), or a relational-stage error
    /// when the relational insert fails.
    pub async fn write_product(&self, product: Product) -> Result<WriteOutcome, WriteError> {
        let kind = RecordKind::Product;
        within_deadline(
            self.store_call_timeout,
            "insert product document",
            self.documents.insert_product(&product),
            |operation| DocumentStoreError::timeout(operation),
        )
        .await
        .map_err(|cause| document_stage_failed(kind, cause))?;
        debug!(%kind, state = WriteState::DocumentWritten.as_str(), "dual write progressed");

        within_deadline(
            self.store_call_timeout,
            "insert product row",
            self.relational.insert_product(&product),
            |operation| RelationalStoreError::timeout(operation),
        )
        .await
        .map_err(|cause| relational_stage_failed(kind, product.name(), cause.into()))?;

        Ok(both_written(kind))
    }
}

fn both_written(kind: RecordKind) -> WriteOutcome {
    debug!(%kind, state = WriteState::BothWritten.as_str(), "dual write completed");
    WriteOutcome::both_written(kind)
}

fn document_stage_failed(kind: RecordKind, cause: DocumentStoreError) -> WriteError {
    warn!(
        %kind,
        error_kind = cause.kind(),
        error = %cause,
        "document store write failed; relational store not attempted"
    );
    WriteError::new(kind, cause)
}

/// Emit the reconciliation record for a partial write.
fn relational_stage_failed(kind: RecordKind, key: &str, cause: WriteFailure) -> WriteError {
    warn!(
        event = "dual_write.partial",
        %kind,
        key,
        error = %cause,
        "record exists in the document store but not the relational store"
    );
    WriteError::new(kind, cause)
}

#[async_trait]
impl<D, R> RecordWriter for DualWriteCoordinator<D, R>
where
    D: DocumentStore + 'static,
    R: RelationalStore + 'static,
{
    async fn write_user(&self, user: User) -> Result<WriteOutcome, WriteError> {
        DualWriteCoordinator::write_user(self, user).await
    }

    async fn write_product(&self, product: Product) -> Result<WriteOutcome, WriteError> {
        DualWriteCoordinator::write_product(self, product).await
    }
}
