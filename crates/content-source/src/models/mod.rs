//! Content source models
//!
//! - `listing` - Validated records handed to the catalog (Listing, RemoteProduct, RemoteFields)
//! - `contentful` - Wire format of the content API entries endpoint

pub(crate) mod contentful;
mod listing;

pub use listing::{Listing, RemoteFields, RemoteProduct};
