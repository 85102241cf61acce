//! Driving port for creating records in both stores.
//!
//! HTTP handlers depend on this port rather than on the stores, so handler
//! tests can substitute a double without any I/O.

use async_trait::async_trait;

use crate::domain::{Product, User, WriteError, WriteOutcome};

/// Domain use-case port for dual writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordWriter: Send + Sync {
    /// Persist a user to the document store, then the relational store.
    async fn write_user(&self, user: User) -> Result<WriteOutcome, WriteError>;

    /// Persist a product to the document store, then the relational store.
    async fn write_product(&self, product: Product) -> Result<WriteOutcome, WriteError>;
}
