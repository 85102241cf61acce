//! Driven port for the document store.
//!
//! The document store is the system of origin: API writes land here first,
//! and its collections are the source of the startup migration. It enforces
//! no uniqueness, so every insert appends.

use async_trait::async_trait;

use crate::domain::{Product, User};

use super::define_port_error;

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// The store could not be reached.
        Connection { message: String } => "document store connection failed: {message}",
        /// A read or write failed during execution.
        Query { message: String } => "document store query failed: {message}",
        /// A stored document does not match the record shape.
        Decode { message: String } => "document could not be decoded: {message}",
        /// The call did not finish before the caller's deadline.
        Timeout { operation: String } => "document store call timed out: {operation}",
    }
}

/// Finite snapshot of a collection, read in full when the listing was made.
///
/// Items are decoded one by one, so a malformed document surfaces as a
/// single `Err` item instead of failing the listing. The batch can be cloned
/// to iterate it again.
#[derive(Debug, Clone)]
pub struct SourceBatch<T> {
    items: Vec<Result<T, DocumentStoreError>>,
}

impl<T> SourceBatch<T> {
    /// Wrap already-decoded items.
    pub fn new(items: Vec<Result<T, DocumentStoreError>>) -> Self {
        Self { items }
    }
}

impl<T> Default for SourceBatch<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> IntoIterator for SourceBatch<T> {
    type Item = Result<T, DocumentStoreError>;
    type IntoIter = std::vec::IntoIter<Result<T, DocumentStoreError>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T> FromIterator<Result<T, DocumentStoreError>> for SourceBatch<T> {
    fn from_iter<I: IntoIterator<Item = Result<T, DocumentStoreError>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Create and list operations against the document store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append a user document.
    async fn insert_user(&self, user: &User) -> Result<(), DocumentStoreError>;

    /// Append a product document.
    async fn insert_product(&self, product: &Product) -> Result<(), DocumentStoreError>;

    /// Read every user document.
    ///
    /// Fails as a whole only when the collection cannot be opened.
    async fn list_users(&self) -> Result<SourceBatch<User>, DocumentStoreError>;

    /// Read every product document.
    ///
    /// Fails as a whole only when the collection cannot be opened.
    async fn list_products(&self) -> Result<SourceBatch<Product>, DocumentStoreError>;
}
