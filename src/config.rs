//! Service configuration from environment variables.
//!
//! | Variable              | Default                                  |
//! |-----------------------|------------------------------------------|
//! | `PORT`                | `3000`                                   |
//! | `CAPITALS_DATASET`    | embedded dataset                         |
//! | `ENRICHMENT_ENABLED`  | `true`                                   |
//! | `UNSPLASH_ACCESS_KEY` | unset (photos disabled)                  |
//! | `UNSPLASH_BASE_URL`   | `https://api.unsplash.com`               |
//! | `WIKIPEDIA_BASE_URL`  | `https://en.wikipedia.org/api/rest_v1`   |
//! | `HTTP_TIMEOUT_MS`     | `10000`                                  |
//! | `PHOTO_COUNT`         | `5`                                      |

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::capitals::{CapitalRepository, CapitalResolver, RepositoryError};
use crate::enrichment::{EnrichmentError, UnsplashPhotoProvider, WikipediaDescriptionProvider};

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Enrichment provider setup failed: {0}")]
    Enrichment(#[from] EnrichmentError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerConfig {
    pub port: u16,
    pub dataset_path: Option<PathBuf>,
    pub enrichment_enabled: bool,
    pub unsplash_access_key: Option<String>,
    pub unsplash_base_url: String,
    pub wikipedia_base_url: String,
    pub http_timeout: Duration,
    pub photo_count: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            dataset_path: None,
            enrichment_enabled: true,
            unsplash_access_key: None,
            unsplash_base_url: crate::enrichment::unsplash::DEFAULT_BASE_URL.to_string(),
            wikipedia_base_url: crate::enrichment::wikipedia::DEFAULT_BASE_URL.to_string(),
            http_timeout: Duration::from_millis(10_000),
            photo_count: crate::capitals::resolver::DEFAULT_PHOTO_COUNT,
        }
    }
}

impl ExplorerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(port) = get("PORT") {
            config.port = parse("PORT", &port)?;
        }
        config.dataset_path = get("CAPITALS_DATASET").map(PathBuf::from);
        if let Some(enabled) = get("ENRICHMENT_ENABLED") {
            config.enrichment_enabled = parse_bool("ENRICHMENT_ENABLED", &enabled)?;
        }
        config.unsplash_access_key = get("UNSPLASH_ACCESS_KEY");
        if let Some(url) = get("UNSPLASH_BASE_URL") {
            config.unsplash_base_url = url;
        }
        if let Some(url) = get("WIKIPEDIA_BASE_URL") {
            config.wikipedia_base_url = url;
        }
        if let Some(ms) = get("HTTP_TIMEOUT_MS") {
            config.http_timeout = Duration::from_millis(parse("HTTP_TIMEOUT_MS", &ms)?);
        }
        if let Some(count) = get("PHOTO_COUNT") {
            config.photo_count = parse("PHOTO_COUNT", &count)?;
        }

        Ok(config)
    }

    pub fn load_repository(&self) -> Result<Arc<CapitalRepository>, ConfigError> {
        match &self.dataset_path {
            Some(path) => Ok(Arc::new(CapitalRepository::from_path(path)?)),
            None => Ok(CapitalRepository::embedded()?),
        }
    }

    /// Resolver wired with the enrichment providers this config enables.
    pub fn build_resolver(
        &self,
        repository: Arc<CapitalRepository>,
    ) -> Result<CapitalResolver, ConfigError> {
        let mut resolver = CapitalResolver::new(repository).with_photo_count(self.photo_count);
        if !self.enrichment_enabled {
            log::info!("Enrichment disabled; records carry base data only");
            return Ok(resolver);
        }

        match &self.unsplash_access_key {
            Some(key) => {
                let provider =
                    UnsplashPhotoProvider::new(&self.unsplash_base_url, key, self.http_timeout)?;
                resolver = resolver.with_photo_provider(Arc::new(provider));
            }
            None => log::warn!("UNSPLASH_ACCESS_KEY not set; photos disabled"),
        }

        let descriptions =
            WikipediaDescriptionProvider::new(&self.wikipedia_base_url, self.http_timeout)?;
        Ok(resolver.with_description_provider(Arc::new(descriptions)))
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}
