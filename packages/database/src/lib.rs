#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location storage for the locator API.
//!
//! [`LocationStore`] is the only seam through which services touch durable
//! state. Two backends implement it:
//!
//! - [`memory::MemoryStore`] keeps documents in a map behind an async lock.
//! - [`sqlite::SqliteStore`] persists documents in `SQLite` via
//!   `switchy_database`, with embedded reviews stored as JSON.
//!
//! Both backends share the document schema rules in [`schema`] and the
//! haversine ranking in [`nearest`].

pub mod memory;
pub mod nearest;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;
use locator_location_models::{
    GeoCoordinate, Location, LocationDetails, LocationReviews, NearQuery, NearestHit, NewLocation,
};

pub use schema::FieldErrors;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The database could not be opened.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of what went wrong.
        message: String,
    },

    /// I/O error while preparing the database location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An embedded document column could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored row could not be converted into a model type.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// The document failed schema validation. Keys are field paths.
    #[error("Validation failed: {0:?}")]
    Validation(FieldErrors),

    /// A save targeted a location that does not exist.
    #[error("Location {id} not found")]
    NotFound {
        /// The missing location id.
        id: String,
    },
}

/// Persistence operations on location documents.
///
/// Reads and writes are split by projection: callers that only need the
/// reviews use [`get_reviews`](Self::get_reviews) and
/// [`save_reviews`](Self::save_reviews), which never touch the other
/// fields; [`save_details`](Self::save_details) never touches the reviews or
/// the rating.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Validates and stores a new location, assigning its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the document breaks the schema,
    /// or another [`StoreError`] if the write fails.
    async fn create_location(&self, location: NewLocation) -> Result<Location, StoreError>;

    /// Loads a full location.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails.
    async fn get_location(&self, id: &str) -> Result<Option<Location>, StoreError>;

    /// Loads a location without its reviews and rating.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails.
    async fn get_details(&self, id: &str) -> Result<Option<LocationDetails>, StoreError>;

    /// Loads the reviews of a location along with its name and rating.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails.
    async fn get_reviews(&self, id: &str) -> Result<Option<LocationReviews>, StoreError>;

    /// Overwrites every detail field of an existing location.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the location no longer exists,
    /// [`StoreError::Validation`] on schema violations, or another
    /// [`StoreError`] if the write fails.
    async fn save_details(&self, details: LocationDetails) -> Result<LocationDetails, StoreError>;

    /// Replaces the review list of an existing location.
    ///
    /// Reviews without an id are assigned one. The returned value carries
    /// the reviews as stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the location no longer exists,
    /// [`StoreError::Validation`] on schema violations, or another
    /// [`StoreError`] if the write fails.
    async fn save_reviews(&self, reviews: LocationReviews) -> Result<LocationReviews, StoreError>;

    /// Sets the derived rating of a location.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the location no longer exists, or
    /// another [`StoreError`] if the write fails.
    async fn set_rating(&self, id: &str, rating: i32) -> Result<(), StoreError>;

    /// Deletes a location and its reviews. Returns whether anything was
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    async fn delete_location(&self, id: &str) -> Result<bool, StoreError>;

    /// Returns locations within `query.max_distance_meters` of `origin`,
    /// nearest first, at most `query.limit` of them.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails.
    async fn nearest_locations(
        &self,
        origin: GeoCoordinate,
        query: NearQuery,
    ) -> Result<Vec<NearestHit>, StoreError>;
}

/// Generates a new document id.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Assigns ids to reviews that have not been persisted yet.
pub(crate) fn assign_review_ids(reviews: &mut LocationReviews) {
    for review in &mut reviews.reviews {
        if review.id.is_none() {
            review.id = Some(new_id());
        }
    }
}
