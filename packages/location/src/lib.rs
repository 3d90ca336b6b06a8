#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location and review services for the locator API.
//!
//! [`locations::LocationService`] handles location CRUD and distance
//! listings. [`reviews::ReviewService`] handles the embedded reviews and,
//! after every successful review write, asks the
//! [`rating::RatingAggregator`] to recompute the location's average rating.
//! Both services hold the store they were constructed with; nothing here
//! touches durable state except through [`LocationStore`].

pub mod locations;
pub mod rating;
pub mod reviews;

#[cfg(test)]
mod test_support;

use locator_database::{FieldErrors, StoreError};
use locator_location_models::InvalidCoordinate;
use strum_macros::Display;

pub use locator_database::LocationStore;
pub use locations::LocationService;
pub use rating::{RatingAggregator, RecomputeMode};
pub use reviews::ReviewService;

/// What a request referred to that could not be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Missing {
    /// No location id was supplied.
    #[strum(to_string = "Not found, locationid is required")]
    LocationId,
    /// The location id or review id was not supplied.
    #[strum(to_string = "Not found, locationid and reviewid are both required")]
    ReviewIds,
    /// No location has the given id.
    #[strum(to_string = "Location not found")]
    Location,
    /// The location has no reviews at all.
    #[strum(to_string = "No reviews found")]
    Reviews,
    /// The location has reviews but none with the given id.
    #[strum(to_string = "Review not found")]
    Review,
}

/// Errors returned by the location and review services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Longitude/latitude on a write were not finite numbers.
    #[error("Invalid coordinates")]
    InvalidCoordinate(#[from] InvalidCoordinate),

    /// Query parameters were missing or malformed.
    #[error("{message}")]
    BadRequest {
        /// Description for the client.
        message: String,
    },

    /// Submitted fields broke the document schema. Keys are field paths.
    #[error("Validation failed: {0:?}")]
    Validation(FieldErrors),

    /// The referenced entity does not exist.
    #[error("{0}")]
    NotFound(Missing),

    /// The store failed to read or write.
    #[error("Store error: {0}")]
    Persistence(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(errors) => Self::Validation(errors),
            StoreError::NotFound { .. } => Self::NotFound(Missing::Location),
            other => Self::Persistence(other),
        }
    }
}

/// Rejects blank path ids.
fn require_id(id: &str, missing: Missing) -> Result<&str, ServiceError> {
    if id.trim().is_empty() {
        Err(ServiceError::NotFound(missing))
    } else {
        Ok(id)
    }
}
