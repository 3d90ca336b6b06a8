//! Reviews embedded in locations.
//!
//! Every mutation follows the same sequence: load the location's review
//! list, change it in memory, save the whole list, then hand the location
//! to the [`RatingAggregator`]. The load and the save are separate store
//! calls, so two concurrent mutations of the same location can overwrite
//! each other's review list.

use std::sync::Arc;

use locator_database::LocationStore;
use locator_location_models::{
    LocationRef, LocationReviews, Review, ReviewFields, ReviewWithLocation,
};

use crate::{Missing, RatingAggregator, RecomputeMode, ServiceError, require_id};

/// Adds, reads, edits, and removes reviews, keeping ratings current.
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn LocationStore>,
    aggregator: RatingAggregator,
    mode: RecomputeMode,
}

impl std::fmt::Debug for ReviewService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewService")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl ReviewService {
    /// Creates a service backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn LocationStore>, mode: RecomputeMode) -> Self {
        Self {
            aggregator: RatingAggregator::new(store.clone()),
            store,
            mode,
        }
    }

    /// Appends a review to a location.
    ///
    /// Returns the review as stored, including its assigned id.
    ///
    /// # Errors
    ///
    /// * [`ServiceError::NotFound`] if the id is blank or unknown
    /// * [`ServiceError::Validation`] if the store rejects the review
    /// * [`ServiceError::Persistence`] if the save fails (or, in synchronous
    ///   mode, the rating update fails)
    pub async fn add_review(
        &self,
        location_id: &str,
        fields: ReviewFields,
    ) -> Result<Review, ServiceError> {
        let location_id = require_id(location_id, Missing::LocationId)?;
        let mut location = self.load(location_id).await?;

        location.reviews.push(Review::new(fields));
        let mut saved = self.store.save_reviews(location).await?;

        self.aggregator
            .dispatch(location_id.to_string(), self.mode)
            .await?;

        saved
            .reviews
            .pop()
            .ok_or(ServiceError::NotFound(Missing::Review))
    }

    /// Loads one review with the id and name of its location.
    ///
    /// # Errors
    ///
    /// * [`ServiceError::NotFound`] if the location is unknown, has no
    ///   reviews, or has no review with this id
    /// * [`ServiceError::Persistence`] if the read fails
    pub async fn read_one(
        &self,
        location_id: &str,
        review_id: &str,
    ) -> Result<ReviewWithLocation, ServiceError> {
        let location = self.load(location_id).await?;
        let index = locate(&location, review_id)?;

        let LocationReviews {
            id,
            name,
            mut reviews,
            ..
        } = location;

        Ok(ReviewWithLocation {
            location: LocationRef { id, name },
            review: reviews.swap_remove(index),
        })
    }

    /// Overwrites the author, rating, and text of a review.
    ///
    /// # Errors
    ///
    /// * [`ServiceError::NotFound`] if either id is blank, the location is
    ///   unknown, has no reviews, or has no review with this id
    /// * [`ServiceError::Validation`] if the store rejects the review
    /// * [`ServiceError::Persistence`] if the save fails (or, in synchronous
    ///   mode, the rating update fails)
    pub async fn update_review(
        &self,
        location_id: &str,
        review_id: &str,
        fields: ReviewFields,
    ) -> Result<Review, ServiceError> {
        let (location_id, review_id) = require_ids(location_id, review_id)?;
        let mut location = self.load(location_id).await?;
        let index = locate(&location, review_id)?;

        location.reviews[index].apply(fields);
        let mut saved = self.store.save_reviews(location).await?;

        self.aggregator
            .dispatch(location_id.to_string(), self.mode)
            .await?;

        Ok(saved.reviews.swap_remove(index))
    }

    /// Removes a review from a location.
    ///
    /// # Errors
    ///
    /// * [`ServiceError::NotFound`] if either id is blank, the location is
    ///   unknown, has no reviews, or has no review with this id
    /// * [`ServiceError::Persistence`] if the save fails (or, in synchronous
    ///   mode, the rating update fails)
    pub async fn delete_review(
        &self,
        location_id: &str,
        review_id: &str,
    ) -> Result<(), ServiceError> {
        let (location_id, review_id) = require_ids(location_id, review_id)?;
        let mut location = self.load(location_id).await?;
        let index = locate(&location, review_id)?;

        location.reviews.remove(index);
        self.store.save_reviews(location).await?;

        self.aggregator
            .dispatch(location_id.to_string(), self.mode)
            .await
    }

    async fn load(&self, location_id: &str) -> Result<LocationReviews, ServiceError> {
        self.store
            .get_reviews(location_id)
            .await?
            .ok_or(ServiceError::NotFound(Missing::Location))
    }
}

fn require_ids<'a>(
    location_id: &'a str,
    review_id: &'a str,
) -> Result<(&'a str, &'a str), ServiceError> {
    Ok((
        require_id(location_id, Missing::ReviewIds)?,
        require_id(review_id, Missing::ReviewIds)?,
    ))
}

/// Index of the review with `review_id`, distinguishing a location with no
/// reviews from an unmatched id.
fn locate(location: &LocationReviews, review_id: &str) -> Result<usize, ServiceError> {
    if location.reviews.is_empty() {
        return Err(ServiceError::NotFound(Missing::Reviews));
    }
    location
        .position(review_id)
        .ok_or(ServiceError::NotFound(Missing::Review))
}
