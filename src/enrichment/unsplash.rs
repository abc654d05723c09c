//! Unsplash photo search.
//!
//! Calls `GET {base_url}/search/photos?query=..&per_page=..` with a
//! `Client-ID` authorization header and maps results to [`Photo`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{EnrichmentError, PhotoProvider};
use crate::capitals::Photo;

pub const DEFAULT_BASE_URL: &str = "https://api.unsplash.com";

/// Unsplash caps `per_page` at 30.
const MAX_PER_PAGE: usize = 30;

/// Photo provider backed by the Unsplash search API.
pub struct UnsplashPhotoProvider {
    base_url: String,
    access_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    urls: PhotoUrls,
    user: PhotoUser,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
    small: String,
}

#[derive(Debug, Deserialize)]
struct PhotoUser {
    name: String,
    links: UserLinks,
}

#[derive(Debug, Deserialize)]
struct UserLinks {
    html: String,
}

impl From<SearchResult> for Photo {
    fn from(result: SearchResult) -> Self {
        Photo {
            url: result.urls.regular,
            thumb_url: result.urls.small,
            photographer: result.user.name,
            photographer_url: result.user.links.html,
        }
    }
}

impl UnsplashPhotoProvider {
    pub fn new(
        base_url: impl Into<String>,
        access_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EnrichmentError> {
        let access_key = access_key.into();
        if access_key.trim().is_empty() {
            return Err(EnrichmentError::InvalidConfig(
                "Unsplash access key is empty".to_string(),
            ));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_key,
            client,
        })
    }
}

#[async_trait]
impl PhotoProvider for UnsplashPhotoProvider {
    fn name(&self) -> &str {
        "unsplash"
    }

    async fn photos(&self, query: &str, count: usize) -> Result<Vec<Photo>, EnrichmentError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let per_page = count.min(MAX_PER_PAGE).to_string();
        let url = format!("{}/search/photos", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .header("Accept-Version", "v1")
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("orientation", "landscape"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Status {
                provider: self.name().to_string(),
                status: status.as_u16(),
            });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| EnrichmentError::Malformed(e.to_string()))?;

        Ok(body
            .results
            .into_iter()
            .take(count)
            .map(Photo::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected() {
        let result = UnsplashPhotoProvider::new(DEFAULT_BASE_URL, "  ", Duration::from_secs(1));
        assert!(matches!(result, Err(EnrichmentError::InvalidConfig(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider =
            UnsplashPhotoProvider::new("http://localhost:9/", "key", Duration::from_secs(1)).unwrap();
        assert_eq!(provider.base_url, "http://localhost:9");
    }

    #[test]
    fn test_search_result_mapping() {
        let json = serde_json::json!({
            "results": [{
                "urls": {"regular": "https://img/regular.jpg", "small": "https://img/small.jpg"},
                "user": {"name": "Ada", "links": {"html": "https://unsplash.com/@ada"}}
            }]
        });
        let response: SearchResponse = serde_json::from_value(json).unwrap();
        let photos: Vec<Photo> = response.results.into_iter().map(Photo::from).collect();
        assert_eq!(photos[0].thumb_url, "https://img/small.jpg");
        assert_eq!(photos[0].photographer, "Ada");
        assert_eq!(photos[0].photographer_url, "https://unsplash.com/@ada");
    }

    #[tokio::test]
    async fn test_zero_count_skips_request() {
        // Port 9 (discard) is never contacted when no photos are requested.
        let provider =
            UnsplashPhotoProvider::new("http://127.0.0.1:9", "key", Duration::from_millis(50)).unwrap();
        assert!(provider.photos("Paris", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_error() {
        let provider =
            UnsplashPhotoProvider::new("http://127.0.0.1:9", "key", Duration::from_millis(200)).unwrap();
        assert!(provider.photos("Paris", 3).await.is_err());
    }
}
