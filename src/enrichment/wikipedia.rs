//! Wikipedia REST summary lookups.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{DescriptionProvider, EnrichmentError};

pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org/api/rest_v1";

/// Description provider backed by `GET {base}/page/summary/{title}`.
pub struct WikipediaDescriptionProvider {
    base_url: reqwest::Url,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct PageSummary {
    #[serde(default)]
    extract: Option<String>,
}

impl WikipediaDescriptionProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EnrichmentError> {
        let base_url = reqwest::Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| EnrichmentError::InvalidConfig(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(EnrichmentError::InvalidConfig(format!(
                "{} cannot be used as a base URL",
                base_url
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("capital-explorer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { base_url, client })
    }

    /// Summary URL for an article; spaces become underscores and the title
    /// is percent-encoded as a single path segment.
    fn summary_url(&self, title: &str) -> Result<reqwest::Url, EnrichmentError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| EnrichmentError::InvalidConfig("base URL has no path".to_string()))?
            .pop_if_empty()
            .push("page")
            .push("summary")
            .push(&title.trim().replace(' ', "_"));
        Ok(url)
    }
}

#[async_trait]
impl DescriptionProvider for WikipediaDescriptionProvider {
    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn describe(&self, title: &str) -> Result<Option<String>, EnrichmentError> {
        if title.trim().is_empty() {
            return Ok(None);
        }
        let url = self.summary_url(title)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(EnrichmentError::Status {
                provider: self.name().to_string(),
                status: status.as_u16(),
            });
        }

        let summary: PageSummary = response
            .json()
            .await
            .map_err(|e| EnrichmentError::Malformed(e.to_string()))?;
        Ok(summary.extract.filter(|text| !text.trim().is_empty()))
    }
}
