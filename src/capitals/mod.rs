//! Capital data: the dataset, the resolver, and geographic ranking.
//!
//! # Architecture
//!
//! ```text
//! data/capitals.json (or CAPITALS_DATASET)
//!   ↓  CapitalRepository::from_json_str()
//! CapitalRepository ── list_all() ──→ roster ──→ geo::rank()
//!   ↓  entry(code)
//! CapitalResolver::resolve()  ←── PhotoProvider / DescriptionProvider
//!   ↓
//! CapitalRecord
//! ```

pub mod error;
pub mod geo;
pub mod repository;
pub mod resolver;
pub mod types;

pub use error::{CapitalError, ErrorKind, RepositoryError};
pub use geo::{haversine_km, nearby, rank, rank_with_distances, RankedCapital, EARTH_RADIUS_KM};
pub use repository::{normalize_code, CapitalEntry, CapitalRepository};
pub use resolver::{CapitalResolver, CapitalSource};
pub use types::{
    format_population, CapitalRecord, CapitalSummary, Country, Currency, GeoPoint, Photo,
    WikipediaInfo,
};
