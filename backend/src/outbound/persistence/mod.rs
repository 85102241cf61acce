//! PostgreSQL persistence adapters using Diesel.
//!
//! Row structs (`models.rs`) and table definitions (`schema.rs`) are internal
//! and never reach the domain. Connections come from a `bb8` pool through
//! `diesel-async`, and every failure is mapped to a
//! [`crate::domain::ports::RelationalStoreError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use dualwrite::outbound::persistence::{DbPool, DieselRelationalStore, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::connect(PoolConfig::new("postgres://localhost/app")).await?;
//! let store = DieselRelationalStore::new(pool);
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

mod diesel_basic_error_mapping;
mod diesel_relational_store;
mod models;
mod pool;
mod schema;

pub use diesel_relational_store::DieselRelationalStore;
pub use pool::{DbPool, PoolConfig, PoolError};
