//! Contentful delivery API client.
//!
//! Lists every entry of the configured content type from
//! `{base}/spaces/{space}/environments/{env}/entries`, following
//! `skip`/`limit`/`total` pagination until the collection is exhausted.
//! The access token is sent as a bearer header.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{header, Client};

use crate::config::ContentfulConfig;
use crate::errors::ContentSourceError;
use crate::models::contentful::{parse_entry, EntriesPage};
use crate::models::Listing;
use crate::provider::ContentSource;

const PROVIDER_ID: &str = "CONTENTFUL";

/// Request timeout for a single page
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest error body kept in `HttpStatus` messages
const MAX_ERROR_BODY: usize = 512;

type Lookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Where the client takes its settings from.
#[derive(Clone)]
enum ConfigSource {
    /// Resolved on every fetch, so a missing key fails the run instead of
    /// process start-up.
    Lookup(Lookup),
    Fixed(ContentfulConfig),
}

/// Content source backed by the Contentful delivery API.
pub struct ContentfulSource {
    client: Client,
    config: ConfigSource,
}

impl ContentfulSource {
    /// Client that resolves its configuration from the environment at fetch time.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Client that resolves its configuration through `lookup` at fetch time.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            client: build_client(),
            config: ConfigSource::Lookup(Arc::new(lookup)),
        }
    }

    /// Client with a fixed configuration.
    pub fn with_config(config: ContentfulConfig) -> Self {
        Self {
            client: build_client(),
            config: ConfigSource::Fixed(config),
        }
    }

    fn resolve_config(&self) -> Result<ContentfulConfig, ContentSourceError> {
        match &self.config {
            ConfigSource::Lookup(lookup) => {
                ContentfulConfig::from_lookup(|key| (lookup.as_ref())(key))
            }
            ConfigSource::Fixed(config) => Ok(config.clone()),
        }
    }

    async fn fetch_page(
        &self,
        config: &ContentfulConfig,
        skip: u64,
    ) -> Result<EntriesPage, ContentSourceError> {
        let url = config.entries_url();
        debug!(
            "{} request: content_type={} skip={} limit={}",
            PROVIDER_ID, config.content_type, skip, config.page_size
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&config.access_token)
            .header(header::CONTENT_TYPE, "application/json")
            .query(&[
                ("content_type", config.content_type.clone()),
                ("skip", skip.to_string()),
                ("limit", config.page_size.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string()
            } else {
                truncate(&body, MAX_ERROR_BODY)
            };
            return Err(ContentSourceError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice::<EntriesPage>(&bytes)
            .map_err(|e| ContentSourceError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ContentSource for ContentfulSource {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_listing(&self) -> Result<Listing, ContentSourceError> {
        let config = self.resolve_config()?;
        let mut listing = Listing::default();
        let mut skip: u64 = 0;

        loop {
            let page = self.fetch_page(&config, skip).await?;
            let count = page.items.len() as u64;

            for raw in page.items {
                match parse_entry(raw) {
                    Ok(product) => listing.items.push(product),
                    Err(e) => {
                        warn!("{}: skipping entry: {}", PROVIDER_ID, e);
                        listing.rejected += 1;
                    }
                }
            }

            skip += count;
            match page.total {
                Some(total) if count > 0 && skip < total => continue,
                _ => break,
            }
        }

        debug!(
            "{} listing fetched: {} entries, {} rejected",
            PROVIDER_ID,
            listing.len(),
            listing.rejected
        );
        Ok(listing)
    }
}

fn build_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

fn truncate(body: &str, max: usize) -> String {
    if body.len() <= max {
        return body.to_string();
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        // 'é' is two bytes; cutting at 2 would split it
        assert_eq!(truncate("aéb", 2), "a...");
    }

    #[test]
    fn test_provider_id() {
        let source = ContentfulSource::with_config(ContentfulConfig {
            base_url: "http://localhost".to_string(),
            content_type: "product".to_string(),
            environment: "master".to_string(),
            access_token: "token".to_string(),
            space_id: "space".to_string(),
            page_size: 10,
        });
        assert_eq!(source.id(), "CONTENTFUL");
    }
}
