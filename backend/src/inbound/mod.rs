//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! HTTP handlers live under [`http`]; [`translation`] maps domain errors to
//! the categories clients see.

pub mod http;
pub mod translation;
