//! Translation of pool and Diesel failures into relational store errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::RelationalStoreError;

use super::pool::PoolError;

/// Map pool failures to connection errors.
pub(crate) fn map_pool_error(error: PoolError) -> RelationalStoreError {
    RelationalStoreError::connection(error.message())
}

/// Map Diesel failures, keeping the server message so callers can see the
/// cause.
pub(crate) fn map_diesel_error(error: DieselError) -> RelationalStoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(%error, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            RelationalStoreError::connection(info.message())
        }
        DieselError::BrokenTransactionManager => {
            RelationalStoreError::connection("transaction manager is in a broken state")
        }
        DieselError::DatabaseError(_, info) => RelationalStoreError::query(info.message()),
        other => RelationalStoreError::query(other.to_string()),
    }
}
