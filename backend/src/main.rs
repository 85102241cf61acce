//! Service entry point: connect both stores, prepare the relational store,
//! then serve `POST /users` and `POST /products`.

mod server;

use std::io;
use std::sync::Arc;

use ortho_config::OrthoConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use dualwrite::config::AppSettings;
use dualwrite::domain::{BulkMigrator, DualWriteCoordinator};
use dualwrite::startup::{connect_stores, prepare_relational_store};

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| io::Error::other(e.to_string()))?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let store_call_timeout = settings.store_call_timeout().map_err(io::Error::other)?;

    let stores = connect_stores(&settings).await.map_err(|e| {
        error!(error = %e, "startup failed");
        io::Error::other(e)
    })?;

    let migrator = BulkMigrator::new(Arc::clone(&stores.documents), Arc::clone(&stores.relational))
        .with_store_call_timeout(store_call_timeout);
    match prepare_relational_store(
        stores.relational.as_ref(),
        &migrator,
        settings.migrate_on_startup(),
        store_call_timeout,
    )
    .await
    {
        Ok(Some(report)) => info!(
            attempted = report.attempted(),
            inserted = report.inserted(),
            skipped_duplicate = report.skipped_duplicate(),
            failed = report.failed(),
            "startup migration complete"
        ),
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "startup failed");
            return Err(io::Error::other(e));
        }
    }

    let coordinator = DualWriteCoordinator::new(
        Arc::clone(&stores.documents),
        Arc::clone(&stores.relational),
    )
    .with_store_call_timeout(store_call_timeout);
    let server = create_server(ServerConfig::new(bind_addr, Arc::new(coordinator)))?;
    let result = server.await;

    // Client clones share one connection pool.
    stores.documents.as_ref().clone().shutdown().await;
    info!("shutdown complete");
    result
}
