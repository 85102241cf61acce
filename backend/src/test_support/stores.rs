//! In-memory store doubles that follow the real adapters' semantics.
//!
//! [`InMemoryDocumentStore`] appends without uniqueness checks and can hold
//! undecodable documents. [`InMemoryRelationalStore`] enforces email
//! uniqueness for users and duplicates products freely. Both accept injected
//! failures so callers can exercise partial writes and unavailable sources.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{
    DocumentStore, DocumentStoreError, InsertOutcome, RelationalStore, RelationalStoreError,
    SchemaInitializer, SourceBatch,
};
use crate::domain::{Product, User};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct DocumentState {
    users: Vec<Result<User, String>>,
    products: Vec<Result<Product, String>>,
    insert_failure: Option<DocumentStoreError>,
    user_listing_failure: Option<DocumentStoreError>,
    product_listing_failure: Option<DocumentStoreError>,
}

/// Document store double backed by two vectors.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    state: Mutex<DocumentState>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append user documents directly, bypassing failure injection.
    pub fn seed_users(&self, users: impl IntoIterator<Item = User>) {
        lock(&self.state).users.extend(users.into_iter().map(Ok));
    }

    /// Append product documents directly, bypassing failure injection.
    pub fn seed_products(&self, products: impl IntoIterator<Item = Product>) {
        lock(&self.state).products.extend(products.into_iter().map(Ok));
    }

    /// Append a user document that fails to decode with `message`.
    pub fn seed_undecodable_user(&self, message: impl Into<String>) {
        lock(&self.state).users.push(Err(message.into()));
    }

    /// Append a product document that fails to decode with `message`.
    pub fn seed_undecodable_product(&self, message: impl Into<String>) {
        lock(&self.state).products.push(Err(message.into()));
    }

    /// Make every subsequent insert fail with `error`.
    pub fn fail_inserts(&self, error: DocumentStoreError) {
        lock(&self.state).insert_failure = Some(error);
    }

    /// Make listing users fail with `error`.
    pub fn fail_user_listing(&self, error: DocumentStoreError) {
        lock(&self.state).user_listing_failure = Some(error);
    }

    /// Make listing products fail with `error`.
    pub fn fail_product_listing(&self, error: DocumentStoreError) {
        lock(&self.state).product_listing_failure = Some(error);
    }

    /// Number of stored user documents, including undecodable ones.
    pub fn user_count(&self) -> usize {
        lock(&self.state).users.len()
    }

    /// Number of stored product documents, including undecodable ones.
    pub fn product_count(&self) -> usize {
        lock(&self.state).products.len()
    }
}

fn snapshot<T: Clone>(items: &[Result<T, String>]) -> SourceBatch<T> {
    items
        .iter()
        .map(|item| item.clone().map_err(|message| DocumentStoreError::decode(message)))
        .collect()
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert_user(&self, user: &User) -> Result<(), DocumentStoreError> {
        let mut state = lock(&self.state);
        if let Some(error) = state.insert_failure.clone() {
            return Err(error);
        }
        state.users.push(Ok(user.clone()));
        Ok(())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), DocumentStoreError> {
        let mut state = lock(&self.state);
        if let Some(error) = state.insert_failure.clone() {
            return Err(error);
        }
        state.products.push(Ok(product.clone()));
        Ok(())
    }

    async fn list_users(&self) -> Result<SourceBatch<User>, DocumentStoreError> {
        let state = lock(&self.state);
        match &state.user_listing_failure {
            Some(error) => Err(error.clone()),
            None => Ok(snapshot(&state.users)),
        }
    }

    async fn list_products(&self) -> Result<SourceBatch<Product>, DocumentStoreError> {
        let state = lock(&self.state);
        match &state.product_listing_failure {
            Some(error) => Err(error.clone()),
            None => Ok(snapshot(&state.products)),
        }
    }
}

#[derive(Default)]
struct RelationalState {
    users: Vec<User>,
    products: Vec<Product>,
    insert_failure: Option<RelationalStoreError>,
    schema_failure: Option<RelationalStoreError>,
}

/// Relational store double with a unique email constraint on users.
#[derive(Default)]
pub struct InMemoryRelationalStore {
    state: Mutex<RelationalState>,
    schema_calls: AtomicUsize,
}

impl InMemoryRelationalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert fail with `error`.
    pub fn fail_inserts(&self, error: RelationalStoreError) {
        lock(&self.state).insert_failure = Some(error);
    }

    /// Make schema initialization fail with `error`.
    pub fn fail_schema(&self, error: RelationalStoreError) {
        lock(&self.state).schema_failure = Some(error);
    }

    /// Stored user rows in insertion order.
    pub fn users(&self) -> Vec<User> {
        lock(&self.state).users.clone()
    }

    /// Stored product rows in insertion order.
    pub fn products(&self) -> Vec<Product> {
        lock(&self.state).products.clone()
    }

    /// How many times the schema was ensured.
    pub fn schema_calls(&self) -> usize {
        self.schema_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelationalStore for InMemoryRelationalStore {
    async fn insert_user(&self, user: &User) -> Result<InsertOutcome, RelationalStoreError> {
        let mut state = lock(&self.state);
        if let Some(error) = state.insert_failure.clone() {
            return Err(error);
        }
        if state.users.iter().any(|row| row.email() == user.email()) {
            return Ok(InsertOutcome::DuplicateSkipped);
        }
        state.users.push(user.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn insert_product(&self, product: &Product) -> Result<(), RelationalStoreError> {
        let mut state = lock(&self.state);
        if let Some(error) = state.insert_failure.clone() {
            return Err(error);
        }
        state.products.push(product.clone());
        Ok(())
    }
}

#[async_trait]
impl SchemaInitializer for InMemoryRelationalStore {
    async fn ensure_schema(&self) -> Result<(), RelationalStoreError> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        match &lock(&self.state).schema_failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
