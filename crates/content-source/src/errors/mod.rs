//! Error types for the content source crate.
//!
//! [`ContentSourceError`] covers the two ways a fetch can fail before any
//! catalog write happens: the source is misconfigured, or the remote call
//! itself failed. [`ContentSourceError::is_transient`] tells the caller which
//! failures are worth another attempt on the next scheduled run.

use thiserror::Error;

/// Errors that can occur while fetching the remote listing.
#[derive(Error, Debug)]
pub enum ContentSourceError {
    /// One or more required settings are missing or blank.
    /// Raised before any network call is attempted.
    #[error("Missing content source configuration: {}", keys.join(", "))]
    MissingConfig {
        /// Environment keys that were absent
        keys: Vec<&'static str>,
    },

    /// A setting is present but unusable.
    #[error("Invalid content source configuration for {key}: {message}")]
    InvalidConfig {
        /// The offending environment key
        key: &'static str,
        /// Why the value was rejected
        message: String,
    },

    /// Transport-level failure (connect, timeout, reset).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The remote answered with a non-success status.
    #[error("Content API returned HTTP {status}: {message}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Response body (truncated) or reason phrase
        message: String,
    },

    /// The response body could not be decoded as a listing page.
    #[error("Failed to decode content API response: {0}")]
    Decode(String),

    /// A single entry failed validation. Entries are rejected individually
    /// and never abort a fetch.
    #[error("Invalid entry {id}: {message}")]
    InvalidEntry {
        /// The entry's remote identifier (or `<unknown>`)
        id: String,
        /// What was wrong with it
        message: String,
    },
}

impl ContentSourceError {
    /// Whether this failure is likely to clear up on its own.
    ///
    /// Transport errors, rate limiting (429) and server errors (5xx) are
    /// transient. Configuration, decoding and client errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::MissingConfig { .. }
            | Self::InvalidConfig { .. }
            | Self::Decode(_)
            | Self::InvalidEntry { .. } => false,
        }
    }

    /// Whether this is a configuration problem rather than a fetch failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingConfig { .. } | Self::InvalidConfig { .. })
    }
}
