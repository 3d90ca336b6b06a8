#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location, review, and coordinate types for the locator API.
//!
//! A [`Location`] owns an ordered list of embedded [`Review`]s and a derived
//! `rating`. Store calls never read or write a whole location when they only
//! need part of it: [`LocationDetails`] carries everything except the reviews
//! and rating, and [`LocationReviews`] carries just the reviews and the
//! fields the rating aggregator needs.

pub mod coordinate;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use coordinate::{GeoCoordinate, InvalidCoordinate};

/// Opening hours for a set of days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningPeriod {
    /// Day range label (e.g. "Monday - Friday").
    pub days: String,
    /// Opening time (e.g. "7:00am").
    #[serde(default)]
    pub opening: String,
    /// Closing time (e.g. "7:00pm").
    #[serde(default)]
    pub closing: String,
    /// Whether the location is closed on these days.
    pub closed: bool,
}

/// A review embedded in a [`Location`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Store-assigned identifier, unique within the owning location.
    ///
    /// `None` until the review has been persisted for the first time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Author display name.
    pub author: String,
    /// Star rating.
    pub rating: i32,
    /// Free-form review body.
    pub review_text: String,
    /// When the review was first written.
    pub created_on: DateTime<Utc>,
}

impl Review {
    /// Builds a new, not yet persisted review from submitted fields.
    #[must_use]
    pub fn new(fields: ReviewFields) -> Self {
        Self {
            id: None,
            author: fields.author,
            rating: fields.rating,
            review_text: fields.review_text,
            created_on: Utc::now(),
        }
    }

    /// Overwrites the author, rating, and text. The id and creation time
    /// are kept.
    pub fn apply(&mut self, fields: ReviewFields) {
        self.author = fields.author;
        self.rating = fields.rating;
        self.review_text = fields.review_text;
    }

    /// Whether this review carries the given id.
    #[must_use]
    pub fn has_id(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }
}

/// Client-editable review fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewFields {
    /// Author display name.
    pub author: String,
    /// Star rating.
    pub rating: i32,
    /// Free-form review body.
    pub review_text: String,
}

/// A stored location with its embedded reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Store-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Facility labels, in submission order.
    pub facilities: Vec<String>,
    /// Position of the location.
    pub coords: GeoCoordinate,
    /// Opening hours.
    pub opening_times: Vec<OpeningPeriod>,
    /// Reviews in insertion order; the last element is the latest.
    pub reviews: Vec<Review>,
    /// Truncated average of the review ratings, as of the last
    /// recomputation.
    pub rating: i32,
}

impl Location {
    /// Returns the details projection of this location.
    #[must_use]
    pub fn details(&self) -> LocationDetails {
        LocationDetails {
            id: self.id.clone(),
            name: self.name.clone(),
            address: self.address.clone(),
            facilities: self.facilities.clone(),
            coords: self.coords,
            opening_times: self.opening_times.clone(),
        }
    }

    /// Returns the reviews projection of this location.
    #[must_use]
    pub fn reviews_projection(&self) -> LocationReviews {
        LocationReviews {
            id: self.id.clone(),
            name: self.name.clone(),
            rating: self.rating,
            reviews: self.reviews.clone(),
        }
    }
}

/// A location that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Facility labels.
    pub facilities: Vec<String>,
    /// Position of the location.
    pub coords: GeoCoordinate,
    /// Opening hours.
    pub opening_times: Vec<OpeningPeriod>,
}

impl NewLocation {
    /// Converts into a stored [`Location`] with the given id, no reviews,
    /// and a zero rating.
    #[must_use]
    pub fn into_location(self, id: String) -> Location {
        Location {
            id,
            name: self.name,
            address: self.address,
            facilities: self.facilities,
            coords: self.coords,
            opening_times: self.opening_times,
            reviews: Vec::new(),
            rating: 0,
        }
    }
}

/// Every location field except `reviews` and `rating`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDetails {
    /// Store-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Facility labels.
    pub facilities: Vec<String>,
    /// Position of the location.
    pub coords: GeoCoordinate,
    /// Opening hours.
    pub opening_times: Vec<OpeningPeriod>,
}

/// The reviews of a location, with the fields needed to aggregate them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationReviews {
    /// Location identifier.
    pub id: String,
    /// Location display name.
    pub name: String,
    /// Current derived rating.
    pub rating: i32,
    /// Reviews in insertion order.
    pub reviews: Vec<Review>,
}

impl LocationReviews {
    /// Index of the review with the given id, if present.
    #[must_use]
    pub fn position(&self, review_id: &str) -> Option<usize> {
        self.reviews.iter().position(|r| r.has_id(review_id))
    }
}

/// Parameters for a nearest-location query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearQuery {
    /// Locations farther than this many meters are excluded.
    pub max_distance_meters: f64,
    /// Maximum number of locations returned.
    pub limit: usize,
}

impl NearQuery {
    /// The query used for distance listings: 20 km radius, 10 results.
    pub const LISTING: Self = Self {
        max_distance_meters: 20_000.0,
        limit: 10,
    };
}

/// A location returned by a nearest-location query.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestHit {
    /// The stored location.
    pub location: Location,
    /// Spherical distance from the query origin in meters.
    pub distance_meters: f64,
}

/// A location as listed by distance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSummary {
    /// Location identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Derived rating.
    pub rating: i32,
    /// Facility labels.
    pub facilities: Vec<String>,
    /// Distance from the query origin, e.g. `"1250m"`.
    pub distance: String,
}

impl From<NearestHit> for LocationSummary {
    fn from(hit: NearestHit) -> Self {
        Self {
            id: hit.location.id,
            name: hit.location.name,
            address: hit.location.address,
            rating: hit.location.rating,
            facilities: hit.location.facilities,
            distance: format_distance(hit.distance_meters),
        }
    }
}

/// Formats a distance as whole meters with an `m` suffix.
#[must_use]
pub fn format_distance(meters: f64) -> String {
    format!("{}m", meters.round())
}

/// Raw location fields as submitted by a client.
///
/// Coordinates are kept as text so that validation happens in one place
/// ([`GeoCoordinate::parse`]). Two opening periods are always carried:
/// creating a location stores only the second, updating stores both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationForm {
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Comma-separated facility labels.
    pub facilities: String,
    /// Longitude text.
    pub lng: String,
    /// Latitude text.
    pub lat: String,
    /// First opening period field set.
    pub first_period: OpeningPeriod,
    /// Second opening period field set.
    pub second_period: OpeningPeriod,
}

/// Splits a comma-separated facilities string into trimmed labels.
///
/// Order is preserved and empty entries are kept, so `"a, ,b"` yields three
/// labels.
#[must_use]
pub fn split_facilities(raw: &str) -> Vec<String> {
    raw.split(',').map(|f| f.trim().to_string()).collect()
}

/// A review together with a reference to its location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewWithLocation {
    /// The owning location.
    pub location: LocationRef,
    /// The review.
    pub review: Review,
}

/// Minimal identification of a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    /// Location identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_facilities_trims_and_keeps_order() {
        assert_eq!(
            split_facilities("Hot drinks , Food,  Premium wifi"),
            vec!["Hot drinks", "Food", "Premium wifi"]
        );
    }

    #[test]
    fn split_facilities_keeps_empty_entries() {
        assert_eq!(split_facilities("a, ,b"), vec!["a", "", "b"]);
        assert_eq!(split_facilities(""), vec![""]);
    }

    #[test]
    fn format_distance_rounds_to_whole_meters() {
        assert_eq!(format_distance(1249.4), "1249m");
        assert_eq!(format_distance(1249.5), "1250m");
        assert_eq!(format_distance(0.0), "0m");
    }

    #[test]
    fn review_apply_keeps_identity() {
        let mut review = Review::new(ReviewFields {
            author: "Simon".to_string(),
            rating: 5,
            review_text: "Great".to_string(),
        });
        review.id = Some("r1".to_string());
        let created = review.created_on;

        review.apply(ReviewFields {
            author: "Charlie".to_string(),
            rating: 2,
            review_text: "Meh".to_string(),
        });

        assert_eq!(review.id.as_deref(), Some("r1"));
        assert_eq!(review.created_on, created);
        assert_eq!(review.author, "Charlie");
        assert_eq!(review.rating, 2);
    }

    #[test]
    fn review_serializes_camel_case_without_pending_id() {
        let review = Review::new(ReviewFields {
            author: "Simon".to_string(),
            rating: 4,
            review_text: "Nice".to_string(),
        });
        let json = serde_json::to_value(&review).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["reviewText"], "Nice");
        assert!(json.get("createdOn").is_some());
    }

    #[test]
    fn summary_from_hit_formats_distance() {
        let location = NewLocation {
            name: "Starcups".to_string(),
            address: "125 High Street".to_string(),
            facilities: vec!["Food".to_string()],
            coords: GeoCoordinate::new(-0.9690, 51.455).unwrap(),
            opening_times: Vec::new(),
        }
        .into_location("loc-1".to_string());

        let summary = LocationSummary::from(NearestHit {
            location,
            distance_meters: 812.6,
        });

        assert_eq!(summary.id, "loc-1");
        assert_eq!(summary.distance, "813m");
        assert_eq!(summary.rating, 0);
    }
}
