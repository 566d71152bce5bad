//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Adapters are thin translators between domain port contracts and a
//! concrete backend. They contain no business logic.
//!
//! - **memory**: process-local document store keeping collections ordered by
//!   identifier.

pub mod memory;
