//! ShelfSync Content Source Crate
//!
//! This crate fetches the full product listing from the remote content API
//! (a Contentful-style content delivery API) that the local catalog mirrors.
//!
//! # Overview
//!
//! ```text
//! +--------------------+     +--------------------+
//! | ContentfulConfig   | --> | ContentfulSource   |  (reqwest, paginated GET)
//! +--------------------+     +--------------------+
//!                                     |
//!                                     v
//!                            +--------------------+
//!                            |  Listing           |  (validated RemoteProducts)
//!                            +--------------------+
//! ```
//!
//! # Core Types
//!
//! - [`ContentSource`] - Trait every remote listing source implements
//! - [`ContentfulSource`] - reqwest-backed implementation for the content API
//! - [`ContentfulConfig`] - Required connection settings, read from the environment
//! - [`Listing`] / [`RemoteProduct`] / [`RemoteFields`] - The fetched records
//! - [`ContentSourceError`] - Configuration and fetch failures

pub mod config;
pub mod errors;
pub mod models;
pub mod provider;

pub use config::ContentfulConfig;
pub use errors::ContentSourceError;
pub use models::{Listing, RemoteFields, RemoteProduct};
pub use provider::contentful::ContentfulSource;
pub use provider::ContentSource;
