//! Great-circle ranking of capitals around a reference point.

use std::cmp::Ordering;

use super::types::{CapitalSummary, GeoPoint};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points, in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Clamp guards against h drifting just above 1.0 for antipodal points.
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// A roster entry paired with its distance from the ranking center.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCapital {
    pub capital: CapitalSummary,
    pub distance_km: f64,
}

/// Order the roster by ascending distance from `center`, ties broken by
/// ascending country code. The roster is not modified.
pub fn rank_with_distances(center: GeoPoint, roster: &[CapitalSummary]) -> Vec<RankedCapital> {
    let mut ranked: Vec<RankedCapital> = roster
        .iter()
        .map(|capital| RankedCapital {
            distance_km: haversine_km(center, capital.coordinates),
            capital: capital.clone(),
        })
        .collect();
    ranked.sort_by(compare_ranked);
    ranked
}

/// Same ordering as [`rank_with_distances`], without the distances.
pub fn rank(center: GeoPoint, roster: &[CapitalSummary]) -> Vec<CapitalSummary> {
    rank_with_distances(center, roster)
        .into_iter()
        .map(|r| r.capital)
        .collect()
}

/// The `limit` closest capitals to `center`, skipping `exclude_code`
/// (typically the capital currently selected).
pub fn nearby(
    center: GeoPoint,
    roster: &[CapitalSummary],
    exclude_code: Option<&str>,
    limit: usize,
) -> Vec<RankedCapital> {
    rank_with_distances(center, roster)
        .into_iter()
        .filter(|r| match exclude_code {
            Some(code) => !r.capital.country_code.eq_ignore_ascii_case(code),
            None => true,
        })
        .take(limit)
        .collect()
}

fn compare_ranked(a: &RankedCapital, b: &RankedCapital) -> Ordering {
    a.distance_km
        .total_cmp(&b.distance_km)
        .then_with(|| a.capital.country_code.cmp(&b.capital.country_code))
}
