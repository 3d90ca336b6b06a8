#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the locator server.
//!
//! Request bodies are lenient about how numbers arrive: coordinates and
//! ratings may be sent as JSON numbers or as numeric strings, matching what
//! HTML form posts produce.

use std::collections::BTreeMap;

use locator_location_models::{LocationForm, OpeningPeriod, ReviewFields};
use serde::{Deserialize, Serialize};

/// A JSON value that may be a number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    /// Sent as a JSON number.
    Number(f64),
    /// Sent as a JSON string.
    Text(String),
}

impl NumberOrText {
    /// Text form of the value, for parsing further down.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }

    /// The value as a whole number, if it is one.
    #[must_use]
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Number(n) => {
                let in_range = (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(n);
                #[allow(clippy::cast_possible_truncation)]
                (in_range && n.fract().abs() < f64::EPSILON).then_some(*n as i32)
            }
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Body of `POST /api/locations` and `PUT /api/locations/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocationBody {
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Comma-separated facility labels.
    pub facilities: String,
    /// Longitude.
    pub lng: Option<NumberOrText>,
    /// Latitude.
    pub lat: Option<NumberOrText>,
    pub days1: String,
    pub opening1: String,
    pub closing1: String,
    pub closed1: bool,
    pub days2: String,
    pub opening2: String,
    pub closing2: String,
    pub closed2: bool,
}

impl From<LocationBody> for LocationForm {
    fn from(body: LocationBody) -> Self {
        Self {
            name: body.name,
            address: body.address,
            facilities: body.facilities,
            lng: body.lng.map(NumberOrText::into_text).unwrap_or_default(),
            lat: body.lat.map(NumberOrText::into_text).unwrap_or_default(),
            first_period: OpeningPeriod {
                days: body.days1,
                opening: body.opening1,
                closing: body.closing1,
                closed: body.closed1,
            },
            second_period: OpeningPeriod {
                days: body.days2,
                opening: body.opening2,
                closing: body.closing2,
                closed: body.closed2,
            },
        }
    }
}

/// Body of the review create and update routes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewBody {
    /// Reviewer name.
    pub author: String,
    /// Rating, 0 to 5.
    pub rating: Option<NumberOrText>,
    /// Review text.
    pub review_text: String,
}

impl TryFrom<ReviewBody> for ReviewFields {
    type Error = BTreeMap<String, String>;

    /// Fails with a per-field error map when the rating is absent or not a
    /// whole number. Range checks are left to the store.
    fn try_from(body: ReviewBody) -> Result<Self, Self::Error> {
        let rating = match &body.rating {
            None => Err("Path `rating` is required.".to_string()),
            Some(value) => value
                .as_integer()
                .ok_or_else(|| "Cast to Number failed for value of path `rating`.".to_string()),
        };

        match rating {
            Ok(rating) => Ok(Self {
                author: body.author,
                rating,
                review_text: body.review_text,
            }),
            Err(message) => Err(BTreeMap::from([("rating".to_string(), message)])),
        }
    }
}

/// Query string of `GET /api/locations`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub lng: Option<String>,
    pub lat: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// `{"message": ...}` body used for not-found responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{"error": ...}` body used for failures. The payload is either a plain
/// message or a map of field errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError<T> {
    pub error: T,
}

impl<T> ApiError<T> {
    #[must_use]
    pub const fn new(error: T) -> Self {
        Self { error }
    }
}
