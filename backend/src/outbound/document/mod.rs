//! MongoDB document store adapter.
//!
//! Records live in the `users` and `products` collections of one database.
//! Inserts always append; listings read the whole collection into a
//! [`crate::domain::ports::SourceBatch`], decoding each document separately.

mod documents;
mod mongo_document_store;

pub use mongo_document_store::MongoDocumentStore;
