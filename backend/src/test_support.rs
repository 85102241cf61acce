//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled when running tests or
//! when the `test-support` feature is enabled.

pub mod stores;

pub use stores::{InMemoryDocumentStore, InMemoryRelationalStore};
