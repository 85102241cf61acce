//! One-shot bulk migration from the document store to the relational store.
//!
//! Users are copied first, then products. A record that cannot be decoded or
//! inserted is recorded in the [`MigrationReport`] and skipped; it never
//! aborts the batch. Re-running is safe for users, whose email conflicts are
//! counted as skipped duplicates, but duplicates every product row.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::RecordKind;
use crate::domain::deadline::within_deadline;
use crate::domain::ports::{
    DocumentStore, DocumentStoreError, InsertOutcome, RelationalStore, RelationalStoreError,
};

/// Why a single source record was not migrated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationRecordError {
    /// The document could not be decoded into a record.
    #[error("decode failed: {0}")]
    Decode(DocumentStoreError),
    /// The relational insert failed.
    #[error("insert failed: {0}")]
    Insert(RelationalStoreError),
}

impl MigrationRecordError {
    /// Stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Insert(_) => "insert",
        }
    }
}

/// A skipped source record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// Kind of the skipped record.
    pub kind: RecordKind,
    /// Zero-based position of the document in its source batch.
    pub position: usize,
    /// Reason the record was skipped.
    pub cause: MigrationRecordError,
}

/// Counts for one record kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindReport {
    /// Source documents read, including undecodable ones.
    pub attempted: usize,
    /// Rows written.
    pub inserted: usize,
    /// Users whose email already existed.
    pub skipped_duplicate: usize,
    /// Documents that failed to decode or insert.
    pub failed: usize,
    /// Set when the source collection could not be opened at all.
    pub source_error: Option<DocumentStoreError>,
    /// One entry per failed document, in source order.
    pub failures: Vec<RecordFailure>,
}

impl KindReport {
    fn source_unavailable(kind: RecordKind, error: DocumentStoreError) -> Self {
        warn!(
            %kind,
            error_kind = error.kind(),
            %error,
            "migration source could not be opened; kind skipped"
        );
        Self {
            source_error: Some(error),
            ..Self::default()
        }
    }

    fn record_failure(&mut self, kind: RecordKind, position: usize, cause: MigrationRecordError) {
        warn!(
            %kind,
            position,
            error_kind = cause.kind(),
            error = %cause,
            "skipping record during migration"
        );
        self.failed += 1;
        self.failures.push(RecordFailure {
            kind,
            position,
            cause,
        });
    }

    fn log_summary(&self, kind: RecordKind) {
        info!(
            %kind,
            attempted = self.attempted,
            inserted = self.inserted,
            skipped_duplicate = self.skipped_duplicate,
            failed = self.failed,
            "migration finished for record kind"
        );
    }
}

/// Outcome of [`BulkMigrator::migrate_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// User migration counts.
    pub users: KindReport,
    /// Product migration counts.
    pub products: KindReport,
}

impl MigrationReport {
    /// Total documents read across both kinds.
    pub fn attempted(&self) -> usize {
        self.users.attempted + self.products.attempted
    }

    /// Total rows written across both kinds.
    pub fn inserted(&self) -> usize {
        self.users.inserted + self.products.inserted
    }

    /// Total user rows skipped as duplicates.
    pub fn skipped_duplicate(&self) -> usize {
        self.users.skipped_duplicate + self.products.skipped_duplicate
    }

    /// Total documents that failed to decode or insert.
    pub fn failed(&self) -> usize {
        self.users.failed + self.products.failed
    }

    /// Kinds whose source collection could not be opened.
    pub fn unavailable_sources(&self) -> Vec<RecordKind> {
        [
            (RecordKind::User, &self.users),
            (RecordKind::Product, &self.products),
        ]
        .into_iter()
        .filter(|(_, report)| report.source_error.is_some())
        .map(|(kind, _)| kind)
        .collect()
    }

    fn describe_unavailable(&self) -> String {
        self.unavailable_sources()
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Fatal migration failures.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// At least one source collection could not be opened. The report holds
    /// whatever the other kind managed to migrate.
    #[error("migration source unavailable for: {}", .report.describe_unavailable())]
    SourceUnavailable {
        /// Partial report, including the source errors.
        report: Box<MigrationReport>,
    },
}

/// Copies every document into the relational store.
#[derive(Clone)]
pub struct BulkMigrator<D, R> {
    documents: Arc<D>,
    relational: Arc<R>,
    store_call_timeout: Option<Duration>,
}

impl<D, R> BulkMigrator<D, R> {
    /// Create a migrator over the given store handles.
    pub fn new(documents: Arc<D>, relational: Arc<R>) -> Self {
        Self {
            documents,
            relational,
            store_call_timeout: None,
        }
    }

    /// Bound every listing and insert by `timeout`.
    #[must_use]
    pub fn with_store_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.store_call_timeout = timeout;
        self
    }
}

impl<D, R> BulkMigrator<D, R>
where
    D: DocumentStore,
    R: RelationalStore,
{
    /// Migrate all users, then all products.
    ///
    /// Per-record failures are recorded in the report and never returned as
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::SourceUnavailable`] when either source
    /// collection could not be opened, after the other kind has still been
    /// migrated.
    pub async fn migrate_all(&self) -> Result<MigrationReport, MigrationError> {
        let report = MigrationReport {
            users: self.migrate_users().await,
            products: self.migrate_products().await,
        };
        info!(
            attempted = report.attempted(),
            inserted = report.inserted(),
            skipped_duplicate = report.skipped_duplicate(),
            failed = report.failed(),
            "bulk migration finished"
        );

        if report.unavailable_sources().is_empty() {
            Ok(report)
        } else {
            Err(MigrationError::SourceUnavailable {
                report: Box::new(report),
            })
        }
    }

    async fn migrate_users(&self) -> KindReport {
        let kind = RecordKind::User;
        let listing = within_deadline(
            self.store_call_timeout,
            "list user documents",
            self.documents.list_users(),
            |operation| DocumentStoreError::timeout(operation),
        )
        .await;
        let batch = match listing {
            Ok(batch) => batch,
            Err(error) => return KindReport::source_unavailable(kind, error),
        };

        let mut report = KindReport::default();
        for (position, item) in batch.into_iter().enumerate() {
            report.attempted += 1;
            let user = match item {
                Ok(user) => user,
                Err(error) => {
                    report.record_failure(kind, position, MigrationRecordError::Decode(error));
                    continue;
                }
            };
            let inserted = within_deadline(
                self.store_call_timeout,
                "insert user row",
                self.relational.insert_user(&user),
                |operation| RelationalStoreError::timeout(operation),
            )
            .await;
            match inserted {
                Ok(InsertOutcome::Inserted) => report.inserted += 1,
                Ok(InsertOutcome::DuplicateSkipped) => report.skipped_duplicate += 1,
                Err(error) => {
                    report.record_failure(kind, position, MigrationRecordError::Insert(error));
                }
            }
        }
        report.log_summary(kind);
        report
    }

    async fn migrate_products(&self) -> KindReport {
        let kind = RecordKind::Product;
        let listing = within_deadline(
            self.store_call_timeout,
            "list product documents",
            self.documents.list_products(),
            |operation| DocumentStoreError::timeout(operation),
        )
        .await;
        let batch = match listing {
            Ok(batch) => batch,
            Err(error) => return KindReport::source_unavailable(kind, error),
        };

        let mut report = KindReport::default();
        for (position, item) in batch.into_iter().enumerate() {
            report.attempted += 1;
            let product = match item {
                Ok(product) => product,
                Err(error) => {
                    report.record_failure(kind, position, MigrationRecordError::Decode(error));
                    continue;
                }
            };
            let inserted = within_deadline(
                self.store_call_timeout,
                "insert product row",
                self.relational.insert_product(&product),
                |operation| RelationalStoreError::timeout(operation),
            )
            .await;
            match inserted {
                Ok(()) => report.inserted += 1,
                Err(error) => {
                    report.record_failure(kind, position, MigrationRecordError::Insert(error));
                }
            }
        }
        report.log_summary(kind);
        report
    }
}
