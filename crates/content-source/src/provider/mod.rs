//! Content source abstractions and implementations.
//!
//! - The `ContentSource` trait the catalog sync depends on
//! - `contentful`: HTTP client for the hosted content API

mod traits;

pub mod contentful;

pub use traits::ContentSource;
