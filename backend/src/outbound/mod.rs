//! Outbound adapters implementing the driven store ports.
//!
//! - **document**: MongoDB-backed [`crate::domain::ports::DocumentStore`]
//! - **persistence**: PostgreSQL-backed
//!   [`crate::domain::ports::RelationalStore`] and
//!   [`crate::domain::ports::SchemaInitializer`] using Diesel
//!
//! Adapters translate between domain records and store representations. They
//! contain no business logic.

pub mod document;
pub mod persistence;
