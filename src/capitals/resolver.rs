//! Capital resolution: dataset row + best-effort enrichment → [`CapitalRecord`].

use std::sync::Arc;

use async_trait::async_trait;

use super::error::CapitalError;
use super::repository::{non_blank, normalize_code, CapitalEntry, CapitalRepository};
use super::types::{CapitalRecord, CapitalSummary, Country, GeoPoint, Photo, WikipediaInfo};
use crate::enrichment::{DescriptionProvider, Enrichment, NoDescriptions, NoPhotos, PhotoProvider};

pub const DEFAULT_PHOTO_COUNT: usize = 5;

/// Anything that can resolve a code to a capital and list the roster.
///
/// The gateway talks to this trait rather than to [`CapitalResolver`]
/// directly so it can be exercised against scripted sources.
#[async_trait]
pub trait CapitalSource: Send + Sync {
    async fn resolve(&self, country_code: &str) -> Result<CapitalRecord, CapitalError>;

    fn list_all(&self) -> &[CapitalSummary];
}

/// Resolves country codes against the repository and enriches the result.
pub struct CapitalResolver {
    repository: Arc<CapitalRepository>,
    photos: Arc<dyn PhotoProvider>,
    descriptions: Arc<dyn DescriptionProvider>,
    photo_count: usize,
}

/// Mandatory fields lifted out of a dataset row.
struct CoreFields {
    name: String,
    country: Country,
    coordinates: GeoPoint,
    population: u64,
    continent: String,
}

impl CoreFields {
    fn from_entry(code: &str, entry: &CapitalEntry) -> Result<Self, CapitalError> {
        let missing = |field: &'static str| CapitalError::DataIntegrity {
            code: code.to_string(),
            field,
        };

        let name = non_blank(&entry.capital).ok_or_else(|| missing("name"))?;
        let country_name = non_blank(&entry.country).ok_or_else(|| missing("country"))?;
        let cca3 = non_blank(&entry.cca3).ok_or_else(|| missing("country"))?;
        let coordinates = entry.coordinates.ok_or_else(|| missing("coordinates"))?;
        let population = entry.population.ok_or_else(|| missing("population"))?;
        let continent = non_blank(&entry.continent).ok_or_else(|| missing("continent"))?;

        Ok(Self {
            name,
            country: Country {
                name: country_name,
                cca2: code.to_string(),
                cca3,
            },
            coordinates,
            population,
            continent,
        })
    }
}

impl CapitalResolver {
    /// Resolver with enrichment disabled.
    pub fn new(repository: Arc<CapitalRepository>) -> Self {
        Self {
            repository,
            photos: Arc::new(NoPhotos),
            descriptions: Arc::new(NoDescriptions),
            photo_count: DEFAULT_PHOTO_COUNT,
        }
    }

    pub fn with_photo_provider(mut self, provider: Arc<dyn PhotoProvider>) -> Self {
        self.photos = provider;
        self
    }

    pub fn with_description_provider(mut self, provider: Arc<dyn DescriptionProvider>) -> Self {
        self.descriptions = provider;
        self
    }

    pub fn with_photo_count(mut self, count: usize) -> Self {
        self.photo_count = count;
        self
    }

    pub fn repository(&self) -> &Arc<CapitalRepository> {
        &self.repository
    }

    /// Resolve a two-letter country code to a full capital record.
    ///
    /// Photos and descriptions are fetched concurrently; a failing source
    /// leaves its field empty.
    pub async fn resolve(&self, country_code: &str) -> Result<CapitalRecord, CapitalError> {
        let code = normalize_code(country_code).ok_or_else(|| {
            CapitalError::InvalidInput(format!(
                "'{}' is not a two-letter country code",
                country_code.trim()
            ))
        })?;

        let entry = self
            .repository
            .entry(&code)
            .ok_or_else(|| CapitalError::NotFound(code.clone()))?;

        let core = CoreFields::from_entry(&code, entry).map_err(|e| {
            log::error!("{}", e);
            e
        })?;

        let capital_title = entry.capital_article.as_deref().unwrap_or(core.name.as_str());
        let country_title = entry.country_article.as_deref().unwrap_or(core.country.name.as_str());
        let photo_query = format!("{} {}", core.name, core.country.name);

        let (photos, capital_description, country_description) = futures::join!(
            self.fetch_photos(&photo_query),
            self.describe(capital_title),
            self.describe(country_title),
        );

        Ok(CapitalRecord {
            name: core.name,
            flag: entry
                .flag
                .clone()
                .unwrap_or_else(|| default_flag_url(&code)),
            country: core.country,
            coordinates: core.coordinates,
            population: core.population,
            continent: core.continent,
            currencies: entry.currencies.clone(),
            photos: photos.unwrap_or_default(),
            wikipedia: WikipediaInfo {
                capital_description: capital_description.into_option(),
                country_description: country_description.into_option(),
            },
        })
    }

    async fn fetch_photos(&self, query: &str) -> Enrichment<Vec<Photo>> {
        let result = self.photos.photos(query, self.photo_count).await.map(Some);
        Enrichment::from_result(self.photos.name(), query, result)
    }

    async fn describe(&self, title: &str) -> Enrichment<String> {
        let result = self.descriptions.describe(title).await;
        Enrichment::from_result(self.descriptions.name(), title, result)
    }
}

#[async_trait]
impl CapitalSource for CapitalResolver {
    async fn resolve(&self, country_code: &str) -> Result<CapitalRecord, CapitalError> {
        CapitalResolver::resolve(self, country_code).await
    }

    fn list_all(&self) -> &[CapitalSummary] {
        self.repository.list_all()
    }
}

fn default_flag_url(code: &str) -> String {
    format!("https://flagcdn.com/w320/{}.png", code.to_ascii_lowercase())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
