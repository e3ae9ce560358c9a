//! Content source trait definition.

use async_trait::async_trait;

use crate::errors::ContentSourceError;
use crate::models::Listing;

/// A remote system that publishes the authoritative product listing.
///
/// Implementations return the complete listing in remote order. Entries that
/// fail validation are left out and counted in [`Listing::rejected`]; a fetch
/// only fails as a whole when the source is misconfigured or the remote call
/// itself fails.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Stable identifier used in logs, e.g. "CONTENTFUL".
    fn id(&self) -> &'static str;

    /// Fetch every published entry.
    async fn fetch_listing(&self) -> Result<Listing, ContentSourceError>;
}
