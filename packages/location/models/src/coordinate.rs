//! Validated longitude/latitude pairs.

use serde::{Deserialize, Serialize};

/// A longitude/latitude pair in WGS84 degrees.
///
/// Longitude is within `[-180, 180]` and latitude within `[-90, 90]`.
/// Serialized as a `GeoJSON` point
/// (`{"type": "Point", "coordinates": [lng, lat]}`), and validated again on
/// deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoPoint", into = "GeoPoint")]
pub struct GeoCoordinate {
    longitude: f64,
    latitude: f64,
}

impl GeoCoordinate {
    /// Creates a coordinate from numeric components.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinate`] if either component is `NaN`, infinite,
    /// or outside its range.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, InvalidCoordinate> {
        if (-180.0..=180.0).contains(&longitude) && (-90.0..=90.0).contains(&latitude) {
            Ok(Self {
                longitude,
                latitude,
            })
        } else {
            Err(InvalidCoordinate)
        }
    }

    /// Parses raw longitude and latitude text (e.g. form or query values).
    ///
    /// Surrounding whitespace is ignored. Trailing garbage (`"12abc"`) is
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinate`] if either value is not a number in
    /// range.
    pub fn parse(lng_raw: &str, lat_raw: &str) -> Result<Self, InvalidCoordinate> {
        let longitude: f64 = lng_raw.trim().parse().map_err(|_| InvalidCoordinate)?;
        let latitude: f64 = lat_raw.trim().parse().map_err(|_| InvalidCoordinate)?;
        Self::new(longitude, latitude)
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }
}

/// Error returned when longitude/latitude input is not a valid WGS84
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCoordinate;

impl std::fmt::Display for InvalidCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Invalid coordinates")
    }
}

impl std::error::Error for InvalidCoordinate {}

/// Wire form of a [`GeoCoordinate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeoPoint {
    #[serde(rename = "type")]
    kind: String,
    coordinates: [f64; 2],
}

impl From<GeoCoordinate> for GeoPoint {
    fn from(coord: GeoCoordinate) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [coord.longitude, coord.latitude],
        }
    }
}

impl TryFrom<GeoPoint> for GeoCoordinate {
    type Error = String;

    fn try_from(point: GeoPoint) -> Result<Self, Self::Error> {
        if point.kind != "Point" {
            return Err(format!("unsupported geometry type: {}", point.kind));
        }
        let [lng, lat] = point.coordinates;
        Self::new(lng, lat).map_err(|e| e.to_string())
    }
}
