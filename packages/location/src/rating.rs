//! Derived average rating for locations.
//!
//! The rating is recomputed from the stored review list after every review
//! write. A location whose last review is deleted keeps its previous
//! rating: an empty review list produces no write at all.

use std::sync::Arc;

use locator_database::{LocationStore, StoreError};
use locator_location_models::Review;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::ServiceError;

/// How a review write waits for the rating recomputation it triggers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RecomputeMode {
    /// Spawn the recomputation and respond without waiting. Failures are
    /// logged only.
    #[default]
    Detached,
    /// Await the recomputation before responding and fail the request if
    /// it fails.
    Synchronous,
}

/// Recomputes and stores location ratings.
#[derive(Clone)]
pub struct RatingAggregator {
    store: Arc<dyn LocationStore>,
}

impl std::fmt::Debug for RatingAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatingAggregator").finish_non_exhaustive()
    }
}

impl RatingAggregator {
    /// Creates an aggregator writing to `store`.
    #[must_use]
    pub fn new(store: Arc<dyn LocationStore>) -> Self {
        Self { store }
    }

    /// Average of the review ratings, truncated toward zero. `None` when
    /// there are no reviews.
    #[must_use]
    pub fn average(reviews: &[Review]) -> Option<i32> {
        if reviews.is_empty() {
            return None;
        }

        let total: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
        let count = i64::try_from(reviews.len()).ok()?;

        // The mean of i32 values always fits in an i32.
        #[allow(clippy::cast_possible_truncation)]
        Some((total / count) as i32)
    }

    /// Reloads the reviews of a location and stores their average.
    ///
    /// Returns the new rating, or `None` if the location is gone or has no
    /// reviews (nothing is written in either case).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if loading the reviews or writing the rating
    /// fails.
    pub async fn recompute(&self, location_id: &str) -> Result<Option<i32>, StoreError> {
        let Some(location) = self.store.get_reviews(location_id).await? else {
            return Ok(None);
        };

        let Some(rating) = Self::average(&location.reviews) else {
            return Ok(None);
        };

        self.store.set_rating(location_id, rating).await?;
        Ok(Some(rating))
    }

    /// Runs [`recompute`](Self::recompute) for a location after a review
    /// write, according to `mode`.
    ///
    /// # Errors
    ///
    /// In [`RecomputeMode::Synchronous`] returns
    /// [`ServiceError::Persistence`] if the recomputation fails. Never
    /// fails in [`RecomputeMode::Detached`].
    pub async fn dispatch(
        &self,
        location_id: String,
        mode: RecomputeMode,
    ) -> Result<(), ServiceError> {
        match mode {
            RecomputeMode::Detached => {
                let aggregator = self.clone();
                tokio::spawn(async move {
                    if let Err(e) = aggregator.recompute_logged(&location_id).await {
                        log::error!("Failed to update rating for location {location_id}: {e}");
                    }
                });
                Ok(())
            }
            RecomputeMode::Synchronous => self
                .recompute_logged(&location_id)
                .await
                .map_err(ServiceError::Persistence),
        }
    }

    async fn recompute_logged(&self, location_id: &str) -> Result<(), StoreError> {
        match self.recompute(location_id).await? {
            Some(rating) => {
                log::info!("Average rating for location {location_id} updated to {rating}");
            }
            None => {
                log::debug!("Location {location_id} has no reviews; rating left unchanged");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FlakyStore, review, seed_location};
    use locator_database::memory::MemoryStore;

    #[test]
    fn average_truncates_toward_zero() {
        let reviews = [review("a", 5), review("b", 3), review("c", 4)];
        assert_eq!(RatingAggregator::average(&reviews), Some(4));

        let reviews = [review("a", 5), review("b", 3), review("c", 4), review("d", 2)];
        assert_eq!(RatingAggregator::average(&reviews), Some(3));

        let reviews = [review("a", 1), review("b", 2)];
        assert_eq!(RatingAggregator::average(&reviews), Some(1));
    }

    #[test]
    fn average_of_nothing_is_none() {
        assert_eq!(RatingAggregator::average(&[]), None);
    }

    #[test]
    fn recompute_mode_parses_from_config_text() {
        assert_eq!(
            "detached".parse::<RecomputeMode>().unwrap(),
            RecomputeMode::Detached
        );
        assert_eq!(
            "Synchronous".parse::<RecomputeMode>().unwrap(),
            RecomputeMode::Synchronous
        );
        assert!("eventually".parse::<RecomputeMode>().is_err());
        assert_eq!(RecomputeMode::Synchronous.as_ref(), "synchronous");
    }

    #[tokio::test]
    async fn recompute_writes_average() {
        let store = Arc::new(MemoryStore::new());
        let id = seed_location(store.as_ref(), &[5, 3, 4]).await;
        let aggregator = RatingAggregator::new(store.clone());

        assert_eq!(aggregator.recompute(&id).await.unwrap(), Some(4));
        let stored = store.get_location(&id).await.unwrap().unwrap();
        assert_eq!(stored.rating, 4);
    }

    #[tokio::test]
    async fn recompute_without_reviews_keeps_previous_rating() {
        let store = Arc::new(MemoryStore::new());
        let id = seed_location(store.as_ref(), &[]).await;
        store.set_rating(&id, 3).await.unwrap();
        let aggregator = RatingAggregator::new(store.clone());

        assert_eq!(aggregator.recompute(&id).await.unwrap(), None);
        let stored = store.get_location(&id).await.unwrap().unwrap();
        assert_eq!(stored.rating, 3);
    }

    #[tokio::test]
    async fn recompute_for_missing_location_is_a_no_op() {
        let aggregator = RatingAggregator::new(Arc::new(MemoryStore::new()));
        assert_eq!(aggregator.recompute("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn synchronous_dispatch_surfaces_failures() {
        let store = Arc::new(FlakyStore::new());
        let id = seed_location(store.inner(), &[4]).await;
        store.fail_rating_writes(true);
        let aggregator = RatingAggregator::new(store.clone());

        let result = aggregator
            .dispatch(id.clone(), RecomputeMode::Synchronous)
            .await;
        assert!(matches!(result, Err(ServiceError::Persistence(_))));

        let result = aggregator.dispatch(id, RecomputeMode::Detached).await;
        assert!(result.is_ok());
    }
}
