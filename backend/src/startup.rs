//! Startup orchestration: connect, ensure the schema, then migrate.
//!
//! Every error here is fatal; `main` stops with a non-zero exit instead of
//! serving traffic.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::config::{AppSettings, SettingsError};
use crate::domain::ports::{
    DocumentStore, DocumentStoreError, RelationalStore, RelationalStoreError, SchemaInitializer,
};
use crate::domain::deadline::within_deadline;
use crate::domain::{BulkMigrator, MigrationError, MigrationReport};
use crate::outbound::document::MongoDocumentStore;
use crate::outbound::persistence::{DbPool, DieselRelationalStore, PoolConfig, PoolError};

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    /// A required setting is missing or malformed.
    #[error("configuration error: {0}")]
    Settings(#[from] SettingsError),
    /// The document store could not be reached.
    #[error("failed to connect to the document store: {0}")]
    DocumentConnection(#[source] DocumentStoreError),
    /// The relational store could not be reached.
    #[error("failed to connect to the relational store: {0}")]
    RelationalConnection(#[source] PoolError),
    /// The relational tables could not be created.
    #[error("failed to ensure relational schema: {0}")]
    Schema(#[source] RelationalStoreError),
    /// A migration source could not be opened.
    #[error(transparent)]
    Migration(#[from] MigrationError),
}

/// Store handles shared by the migrator and the HTTP layer.
pub struct Stores {
    /// Document store handle; call [`MongoDocumentStore::shutdown`] on exit.
    pub documents: Arc<MongoDocumentStore>,
    /// Relational store handle over the connection pool.
    pub relational: Arc<DieselRelationalStore>,
}

/// Open both stores, failing fast when either is unreachable.
///
/// # Errors
///
/// Returns [`StartupError::Settings`] for missing locations and a connection
/// variant when a store does not answer.
pub async fn connect_stores(settings: &AppSettings) -> Result<Stores, StartupError> {
    let documents = MongoDocumentStore::connect(settings.mongodb_uri()?, settings.mongodb_database())
        .await
        .map_err(StartupError::DocumentConnection)?;

    let pool_config = PoolConfig::new(settings.database_url()?)
        .with_max_size(settings.pool_max_size())
        .with_connection_timeout(settings.pool_connection_timeout());
    let pool = DbPool::connect(pool_config)
        .await
        .map_err(StartupError::RelationalConnection)?;
    info!("connected to relational store");

    Ok(Stores {
        documents: Arc::new(documents),
        relational: Arc::new(DieselRelationalStore::new(pool)),
    })
}

/// Ensure the schema and, when enabled, back-fill the relational store.
///
/// Returns the migration report, or `None` when migration is disabled.
/// `store_call_timeout` bounds the schema statements; the migrator carries
/// its own deadline.
///
/// # Errors
///
/// Returns [`StartupError::Schema`] when the tables cannot be created, in
/// which case migration is not attempted, or [`StartupError::Migration`]
/// when a migration source is unavailable.
pub async fn prepare_relational_store<S, D, R>(
    schema: &S,
    migrator: &BulkMigrator<D, R>,
    migrate_on_startup: bool,
    store_call_timeout: Option<Duration>,
) -> Result<Option<MigrationReport>, StartupError>
where
    S: SchemaInitializer + ?Sized,
    D: DocumentStore,
    R: RelationalStore,
{
    within_deadline(
        store_call_timeout,
        "ensure relational schema",
        schema.ensure_schema(),
        |operation| RelationalStoreError::timeout(operation),
    )
    .await
    .map_err(StartupError::Schema)?;

    if !migrate_on_startup {
        info!(reason = "disabled", "bulk migration skipped");
        return Ok(None);
    }

    let report = migrator.migrate_all().await?;
    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockSchemaInitializer;
    use crate::domain::{Product, User};
    use crate::test_support::{InMemoryDocumentStore, InMemoryRelationalStore};
    use rstest::{fixture, rstest};

    struct Harness {
        documents: Arc<InMemoryDocumentStore>,
        relational: Arc<InMemoryRelationalStore>,
    }

    impl Harness {
        fn migrator(&self) -> BulkMigrator<InMemoryDocumentStore, InMemoryRelationalStore> {
            BulkMigrator::new(Arc::clone(&self.documents), Arc::clone(&self.relational))
        }
    }

    #[fixture]
    fn harness() -> Harness {
        let documents = InMemoryDocumentStore::new();
        documents.seed_users([User::try_new("A", "a@x.com", "p").expect("valid user")]);
        documents.seed_products([Product::try_new("Lamp", 19.5, None).expect("valid product")]);
        Harness {
            documents: Arc::new(documents),
            relational: Arc::new(InMemoryRelationalStore::new()),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn schema_then_migration(harness: Harness) {
        let report = prepare_relational_store(
            harness.relational.as_ref(),
            &harness.migrator(),
            true,
            None,
        )
        .await
        .expect("startup succeeds")
        .expect("migration ran");

        assert_eq!(harness.relational.schema_calls(), 1);
        assert_eq!(report.inserted(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn disabled_migration_still_ensures_schema(harness: Harness) {
        let report = prepare_relational_store(
            harness.relational.as_ref(),
            &harness.migrator(),
            false,
            None,
        )
        .await
        .expect("startup succeeds");

        assert!(report.is_none());
        assert_eq!(harness.relational.schema_calls(), 1);
        assert!(harness.relational.users().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn schema_failure_stops_before_migration(harness: Harness) {
        let mut schema = MockSchemaInitializer::new();
        schema
            .expect_ensure_schema()
            .times(1)
            .return_once(|| Err(RelationalStoreError::query("permission denied for schema public")));

        let err = prepare_relational_store(&schema, &harness.migrator(), true, None)
            .await
            .expect_err("schema failure is fatal");

        assert!(matches!(err, StartupError::Schema(_)));
        assert!(harness.relational.users().is_empty());
    }

    struct StalledSchema;

    #[async_trait::async_trait]
    impl SchemaInitializer for StalledSchema {
        async fn ensure_schema(&self) -> Result<(), RelationalStoreError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }
    }

    #[rstest]
    #[tokio::test]
    async fn stalled_schema_step_times_out(harness: Harness) {
        let err = prepare_relational_store(
            &StalledSchema,
            &harness.migrator(),
            true,
            Some(Duration::from_millis(10)),
        )
        .await
        .expect_err("schema step timed out");

        match err {
            StartupError::Schema(cause) => {
                assert_eq!(cause, RelationalStoreError::timeout("ensure relational schema"));
            }
            other => panic!("expected schema error, got {other:?}"),
        }
        assert!(harness.relational.users().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn unavailable_source_is_fatal(harness: Harness) {
        harness
            .documents
            .fail_product_listing(DocumentStoreError::query("not authorized on migrationgo"));

        let err = prepare_relational_store(
            harness.relational.as_ref(),
            &harness.migrator(),
            true,
            None,
        )
        .await
        .expect_err("source failure is fatal");

        match err {
            StartupError::Migration(MigrationError::SourceUnavailable { report }) => {
                assert_eq!(report.users.inserted, 1);
            }
            other => panic!("expected migration error, got {other:?}"),
        }
    }
}
