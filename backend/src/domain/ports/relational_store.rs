//! Driven ports for the relational store.

use async_trait::async_trait;

use crate::domain::{Product, User};

use super::define_port_error;

define_port_error! {
    /// Errors raised by relational store adapters.
    pub enum RelationalStoreError {
        /// A connection could not be checked out or was lost.
        Connection { message: String } => "relational store connection failed: {message}",
        /// A statement failed during execution.
        Query { message: String } => "relational store query failed: {message}",
        /// The call did not finish before the caller's deadline.
        Timeout { operation: String } => "relational store call timed out: {operation}",
    }
}

/// Result of inserting a user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written.
    Inserted,
    /// A row with the same email already existed; nothing was written.
    DuplicateSkipped,
}

/// Create operations against the relational store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationalStore: Send + Sync {
    /// Insert a user row.
    ///
    /// An email uniqueness conflict is not an error: the call returns
    /// [`InsertOutcome::DuplicateSkipped`] and leaves the existing row alone.
    async fn insert_user(&self, user: &User) -> Result<InsertOutcome, RelationalStoreError>;

    /// Insert a product row. Products have no dedup key, so identical calls
    /// produce identical rows.
    async fn insert_product(&self, product: &Product) -> Result<(), RelationalStoreError>;
}

/// Creates the relational tables when they are missing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaInitializer: Send + Sync {
    /// Create the `users` and `products` tables if absent.
    ///
    /// Must be idempotent and must never drop or alter existing tables.
    async fn ensure_schema(&self) -> Result<(), RelationalStoreError>;
}
