//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod document_store;
mod record_writer;
mod relational_store;

#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{DocumentStore, DocumentStoreError, SourceBatch};
#[cfg(test)]
pub use record_writer::MockRecordWriter;
pub use record_writer::RecordWriter;
#[cfg(test)]
pub use relational_store::{MockRelationalStore, MockSchemaInitializer};
pub use relational_store::{
    InsertOutcome, RelationalStore, RelationalStoreError, SchemaInitializer,
};
