//! Capital data model.
//!
//! Field names follow the wire format consumed by the explorer surface
//! (camelCase), so these types serialize directly into tool responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::CapitalError;

// ---------------------------------------------------------------------------
// GeoPoint
// ---------------------------------------------------------------------------

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Create a point, rejecting coordinates outside `[-90, 90]` x `[-180, 180]`.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CapitalError> {
        let point = Self { lat, lng };
        if point.is_valid() {
            Ok(point)
        } else {
            Err(CapitalError::InvalidInput(format!(
                "coordinates out of range: lat={}, lng={}",
                lat, lng
            )))
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// The null island fallback used when no reference point is known.
    pub fn origin() -> Self {
        Self { lat: 0.0, lng: 0.0 }
    }
}

// ---------------------------------------------------------------------------
// Roster entry
// ---------------------------------------------------------------------------

/// One entry of the roster: the minimum needed to place a capital on a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalSummary {
    pub name: String,
    pub country_name: String,
    /// ISO 3166-1 alpha-2, upper case.
    pub country_code: String,
    pub coordinates: GeoPoint,
}

// ---------------------------------------------------------------------------
// Full record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub cca2: String,
    pub cca3: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub url: String,
    pub thumb_url: String,
    pub photographer: String,
    pub photographer_url: String,
}

/// Encyclopedia extracts for the capital and its country. Both optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikipediaInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_description: Option<String>,
}

/// Fully resolved capital city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalRecord {
    pub name: String,
    pub country: Country,
    pub coordinates: GeoPoint,
    /// Flag image URL.
    pub flag: String,
    pub population: u64,
    pub continent: String,
    #[serde(default)]
    pub currencies: Vec<Currency>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub wikipedia: WikipediaInfo,
}

impl CapitalRecord {
    /// Roster projection of this record.
    pub fn summary(&self) -> CapitalSummary {
        CapitalSummary {
            name: self.name.clone(),
            country_name: self.country.name.clone(),
            country_code: self.country.cca2.clone(),
            coordinates: self.coordinates,
        }
    }

    /// Compact context handed back to the agent so it can answer
    /// follow-up questions about the capital currently on screen.
    pub fn model_context(&self) -> Value {
        serde_json::json!({
            "capital": self.name,
            "country": self.country.name,
            "population": format_population(self.population),
            "continent": self.continent,
            "description": self.wikipedia.capital_description,
            "countryDescription": self.wikipedia.country_description,
        })
    }
}

/// Abbreviate a population count: `1.2B`, `68.2M`, `387.8K`, `950`.
pub fn format_population(population: u64) -> String {
    let n = population as f64;
    if population >= 1_000_000_000 {
        format!("{:.1}B", n / 1_000_000_000.0)
    } else if population >= 1_000_000 {
        format!("{:.1}M", n / 1_000_000.0)
    } else if population >= 1_000 {
        format!("{:.1}K", n / 1_000.0)
    } else {
        population.to_string()
    }
}
