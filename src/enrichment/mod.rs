//! Best-effort enrichment sources for capital records.
//!
//! Photos and encyclopedia extracts come from external services that may
//! be slow, rate limited, or down. Providers report failures through
//! [`EnrichmentError`]; the resolver turns every outcome into an
//! [`Enrichment`] value so that a failing source leaves its field empty
//! instead of failing the resolution.

pub mod unsplash;
pub mod wikipedia;

use async_trait::async_trait;

use crate::capitals::Photo;

pub use unsplash::UnsplashPhotoProvider;
pub use wikipedia::WikipediaDescriptionProvider;

/// Enrichment provider errors.
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {provider}")]
    Status { provider: String, status: u16 },

    #[error("Invalid provider configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Source of photos for a capital.
#[async_trait]
pub trait PhotoProvider: Send + Sync {
    /// Provider name used in log lines.
    fn name(&self) -> &str;

    /// Up to `count` photos matching `query`.
    async fn photos(&self, query: &str, count: usize) -> Result<Vec<Photo>, EnrichmentError>;
}

/// Source of short text descriptions.
#[async_trait]
pub trait DescriptionProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Extract for the article titled `title`. `Ok(None)` when the source
    /// has no such article.
    async fn describe(&self, title: &str) -> Result<Option<String>, EnrichmentError>;
}

/// Outcome of one optional field lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment<T> {
    Present(T),
    Absent,
}

impl<T> Enrichment<T> {
    /// Collapse a provider result, logging and discarding any error.
    pub fn from_result(
        provider: &str,
        subject: &str,
        result: Result<Option<T>, EnrichmentError>,
    ) -> Self {
        match result {
            Ok(Some(value)) => Enrichment::Present(value),
            Ok(None) => Enrichment::Absent,
            Err(e) => {
                log::warn!("{} enrichment failed for '{}': {}", provider, subject, e);
                Enrichment::Absent
            }
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Enrichment::Present(value) => Some(value),
            Enrichment::Absent => None,
        }
    }
}

impl<T: Default> Enrichment<T> {
    pub fn unwrap_or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Disabled providers
// ---------------------------------------------------------------------------

/// Photo provider used when no photo service is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPhotos;

#[async_trait]
impl PhotoProvider for NoPhotos {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn photos(&self, _query: &str, _count: usize) -> Result<Vec<Photo>, EnrichmentError> {
        Ok(Vec::new())
    }
}

/// Description provider used when descriptions are turned off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDescriptions;

#[async_trait]
impl DescriptionProvider for NoDescriptions {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn describe(&self, _title: &str) -> Result<Option<String>, EnrichmentError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrichment_from_ok() {
        let e = Enrichment::from_result("test", "Paris", Ok(Some(3)));
        assert_eq!(e, Enrichment::Present(3));
    }

    #[test]
    fn test_enrichment_error_degrades_to_absent() {
        let e: Enrichment<String> = Enrichment::from_result(
            "test",
            "Paris",
            Err(EnrichmentError::Malformed("bad json".to_string())),
        );
        assert_eq!(e, Enrichment::Absent);
        assert_eq!(e.into_option(), None);
    }

    #[test]
    fn test_unwrap_or_default() {
        let e: Enrichment<Vec<Photo>> = Enrichment::Absent;
        assert!(e.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_providers() {
        assert!(NoPhotos.photos("Paris", 5).await.unwrap().is_empty());
        assert_eq!(NoDescriptions.describe("Paris").await.unwrap(), None);
    }
}
