//! In-memory adapters used by the default server build and by tests.

mod document_store;
mod id_minter;

pub use document_store::InMemoryDocumentStore;
