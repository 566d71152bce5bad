//! Domain ports defining the edges of the hexagon.
//!
//! The services only talk to storage through [`DocumentStore`]. Adapters map
//! their failures into [`DocumentStoreError`] variants rather than leaking
//! driver-specific error types.

mod macros;
pub(crate) use macros::define_port_error;

mod document_store;

#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{
    DeleteAck, DocumentStore, DocumentStoreError, Filter, ID_FIELD, Predicate, Query,
};
