//! In-memory capital dataset.
//!
//! Rows are loaded once (from the dataset compiled into the binary, or
//! from a JSON file) and never mutated afterwards. Lookups are by ISO
//! alpha-2 code, case-insensitive.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::Deserialize;

use super::error::RepositoryError;
use super::types::{CapitalSummary, Currency, GeoPoint};

const EMBEDDED_DATASET: &str = include_str!("../../data/capitals.json");

static EMBEDDED: OnceCell<Arc<CapitalRepository>> = OnceCell::new();

/// One dataset row, before enrichment.
///
/// Record fields are optional at this layer; the resolver decides which
/// ones are mandatory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalEntry {
    pub cca2: String,
    pub cca3: Option<String>,
    pub country: Option<String>,
    pub capital: Option<String>,
    pub coordinates: Option<GeoPoint>,
    pub flag: Option<String>,
    pub population: Option<u64>,
    pub continent: Option<String>,
    #[serde(default)]
    pub currencies: Vec<Currency>,
    /// Encyclopedia article title when it differs from the capital name.
    pub capital_article: Option<String>,
    /// Encyclopedia article title when it differs from the country name.
    pub country_article: Option<String>,
}

/// Normalize a country code to upper case, or `None` if it is not two
/// ASCII letters.
pub fn normalize_code(code: &str) -> Option<String> {
    let code = code.trim();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code.to_ascii_uppercase())
    } else {
        None
    }
}

/// The value if present and not blank.
pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

/// Read-only store of every known capital.
#[derive(Debug)]
pub struct CapitalRepository {
    entries: Vec<CapitalEntry>,
    summaries: Vec<CapitalSummary>,
    /// Upper-case alpha-2 code → position in `entries`/`summaries`.
    index: HashMap<String, usize>,
}

impl CapitalRepository {
    /// Build a repository from dataset rows, keeping their order.
    pub fn from_entries(rows: Vec<CapitalEntry>) -> Result<Self, RepositoryError> {
        let mut entries = Vec::with_capacity(rows.len());
        let mut summaries = Vec::with_capacity(rows.len());
        let mut index = HashMap::with_capacity(rows.len());

        for mut row in rows {
            let code = normalize_code(&row.cca2)
                .ok_or_else(|| RepositoryError::InvalidCode(row.cca2.clone()))?;
            if index.contains_key(&code) {
                return Err(RepositoryError::DuplicateCode(code));
            }

            let name = non_blank(&row.capital).ok_or_else(|| RepositoryError::Incomplete {
                code: code.clone(),
                field: "capital",
            })?;
            let country_name = non_blank(&row.country).ok_or_else(|| RepositoryError::Incomplete {
                code: code.clone(),
                field: "country",
            })?;
            let coordinates = row.coordinates.ok_or_else(|| RepositoryError::Incomplete {
                code: code.clone(),
                field: "coordinates",
            })?;
            if !coordinates.is_valid() {
                return Err(RepositoryError::InvalidCoordinates { code });
            }

            row.cca2 = code.clone();
            index.insert(code.clone(), entries.len());
            summaries.push(CapitalSummary {
                name,
                country_name,
                country_code: code,
                coordinates,
            });
            entries.push(row);
        }

        Ok(Self {
            entries,
            summaries,
            index,
        })
    }

    /// Parse a JSON array of dataset rows.
    pub fn from_json_str(json: &str) -> Result<Self, RepositoryError> {
        let rows: Vec<CapitalEntry> = serde_json::from_str(json)?;
        Self::from_entries(rows)
    }

    /// Load a dataset file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RepositoryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let repository = Self::from_json_str(&json)?;
        log::info!(
            "Loaded {} capitals from {}",
            repository.len(),
            path.display()
        );
        Ok(repository)
    }

    /// The dataset compiled into the crate, parsed once per process.
    pub fn embedded() -> Result<Arc<Self>, RepositoryError> {
        EMBEDDED
            .get_or_try_init(|| Self::from_json_str(EMBEDDED_DATASET).map(Arc::new))
            .cloned()
    }

    /// Every capital, in load order.
    pub fn list_all(&self) -> &[CapitalSummary] {
        &self.summaries
    }

    pub fn find_by_code(&self, code: &str) -> Option<&CapitalSummary> {
        self.position(code).map(|i| &self.summaries[i])
    }

    /// The raw dataset row for a code.
    pub fn entry(&self, code: &str) -> Option<&CapitalEntry> {
        self.position(code).map(|i| &self.entries[i])
    }

    pub fn entries(&self) -> &[CapitalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    fn position(&self, code: &str) -> Option<usize> {
        let code = normalize_code(code)?;
        self.index.get(&code).copied()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
