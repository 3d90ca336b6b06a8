//! Spherical nearest-location ranking.

use geo::{Distance as _, Haversine, Point};
use locator_location_models::{GeoCoordinate, Location, NearQuery, NearestHit};

/// Lower bound on the length of one degree of latitude in meters.
///
/// Slightly below the true value so that a latitude band computed from it
/// always contains every point within the requested radius.
const MIN_METERS_PER_DEGREE_LAT: f64 = 110_000.0;

/// Great-circle distance between two coordinates in meters.
#[must_use]
pub fn distance_meters(a: GeoCoordinate, b: GeoCoordinate) -> f64 {
    Haversine.distance(to_point(a), to_point(b))
}

/// Ranks candidate locations by distance from `origin`.
///
/// Drops candidates beyond `query.max_distance_meters`, sorts the rest
/// nearest first (ties keep candidate order), and keeps at most
/// `query.limit`.
#[must_use]
pub fn rank(
    origin: GeoCoordinate,
    candidates: impl IntoIterator<Item = Location>,
    query: NearQuery,
) -> Vec<NearestHit> {
    let mut hits: Vec<NearestHit> = candidates
        .into_iter()
        .map(|location| NearestHit {
            distance_meters: distance_meters(origin, location.coords),
            location,
        })
        .filter(|hit| hit.distance_meters <= query.max_distance_meters)
        .collect();

    hits.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
    hits.truncate(query.limit);
    hits
}

/// Latitude range `(min, max)` that contains every point within
/// `max_distance_meters` of `origin`. Used to prefilter rows in SQL.
#[must_use]
pub fn latitude_band(origin: GeoCoordinate, max_distance_meters: f64) -> (f64, f64) {
    let delta = max_distance_meters / MIN_METERS_PER_DEGREE_LAT;
    (
        (origin.latitude() - delta).max(-90.0),
        (origin.latitude() + delta).min(90.0),
    )
}

fn to_point(coord: GeoCoordinate) -> Point<f64> {
    Point::new(coord.longitude(), coord.latitude())
}
