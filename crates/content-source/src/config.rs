//! Connection settings for the content API.

use std::fmt;

use crate::errors::ContentSourceError;

pub const ENV_BASE_URL: &str = "CONTENTFUL_URL";
pub const ENV_CONTENT_TYPE: &str = "CONTENTFUL_CONTENT_TYPE";
pub const ENV_ENVIRONMENT: &str = "CONTENTFUL_ENVIRONMENT";
pub const ENV_ACCESS_TOKEN: &str = "CONTENTFUL_ACCESS_TOKEN";
pub const ENV_SPACE_ID: &str = "CONTENTFUL_SPACE_ID";
pub const ENV_PAGE_SIZE: &str = "CONTENTFUL_PAGE_SIZE";

/// Entries requested per page when no page size is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Upper bound the content API accepts for `limit`.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Settings needed to list entries from the content API.
///
/// All five connection values are required. `page_size` is optional and
/// defaults to [`DEFAULT_PAGE_SIZE`].
#[derive(Clone, PartialEq, Eq)]
pub struct ContentfulConfig {
    pub base_url: String,
    pub content_type: String,
    pub environment: String,
    pub access_token: String,
    pub space_id: String,
    pub page_size: u32,
}

impl ContentfulConfig {
    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Blank values count as missing. Every missing key is reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ContentSourceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |key: &'static str| -> String {
            match lookup(key).map(|v| v.trim().to_string()) {
                Some(value) if !value.is_empty() => value,
                _ => {
                    missing.push(key);
                    String::new()
                }
            }
        };

        let base_url = required(ENV_BASE_URL);
        let content_type = required(ENV_CONTENT_TYPE);
        let environment = required(ENV_ENVIRONMENT);
        let access_token = required(ENV_ACCESS_TOKEN);
        let space_id = required(ENV_SPACE_ID);

        if !missing.is_empty() {
            return Err(ContentSourceError::MissingConfig { keys: missing });
        }

        let page_size = match lookup(ENV_PAGE_SIZE).map(|v| v.trim().to_string()) {
            Some(raw) if !raw.is_empty() => parse_page_size(&raw)?,
            _ => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            content_type,
            environment,
            access_token,
            space_id,
            page_size,
        })
    }

    /// Entries endpoint for the configured space and environment.
    pub fn entries_url(&self) -> String {
        format!(
            "{}/spaces/{}/environments/{}/entries",
            self.base_url.trim_end_matches('/'),
            self.space_id,
            self.environment
        )
    }
}

fn parse_page_size(raw: &str) -> Result<u32, ContentSourceError> {
    match raw.parse::<u32>() {
        Ok(size) if (1..=MAX_PAGE_SIZE).contains(&size) => Ok(size),
        Ok(size) => Err(ContentSourceError::InvalidConfig {
            key: ENV_PAGE_SIZE,
            message: format!("{} is outside 1..={}", size, MAX_PAGE_SIZE),
        }),
        Err(e) => Err(ContentSourceError::InvalidConfig {
            key: ENV_PAGE_SIZE,
            message: e.to_string(),
        }),
    }
}

// Keeps the access token out of logs.
impl fmt::Debug for ContentfulConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentfulConfig")
            .field("base_url", &self.base_url)
            .field("content_type", &self.content_type)
            .field("environment", &self.environment)
            .field("access_token", &"***")
            .field("space_id", &self.space_id)
            .field("page_size", &self.page_size)
            .finish()
    }
}
