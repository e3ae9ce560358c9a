//! ShelfSync Core - Catalog domain entities, services, and traits.
//!
//! This crate holds the product catalog model and the reconciliation engine
//! that keeps it converged with the remote content listing. It is
//! database-agnostic and defines traits that are implemented by the
//! `storage-sqlite` crate.

pub mod catalog_sync;
pub mod errors;
pub mod products;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
