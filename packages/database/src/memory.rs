//! In-memory [`LocationStore`] backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use locator_location_models::{
    GeoCoordinate, Location, LocationDetails, LocationReviews, NearQuery, NearestHit, NewLocation,
};
use tokio::sync::RwLock;

use crate::{LocationStore, StoreError, assign_review_ids, nearest, new_id, schema};

/// Location documents kept in a map behind an async read/write lock.
///
/// Each store call takes the lock for its own duration only, so a
/// load/modify/save sequence spanning several calls is not atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    locations: RwLock<BTreeMap<String, Location>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every stored location, ordered by id.
    pub async fn snapshot(&self) -> Vec<Location> {
        self.locations.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl LocationStore for MemoryStore {
    async fn create_location(&self, location: NewLocation) -> Result<Location, StoreError> {
        schema::validate_details(&location.name, &location.opening_times)?;

        let location = location.into_location(new_id());
        self.locations
            .write()
            .await
            .insert(location.id.clone(), location.clone());

        Ok(location)
    }

    async fn get_location(&self, id: &str) -> Result<Option<Location>, StoreError> {
        Ok(self.locations.read().await.get(id).cloned())
    }

    async fn get_details(&self, id: &str) -> Result<Option<LocationDetails>, StoreError> {
        Ok(self.locations.read().await.get(id).map(Location::details))
    }

    async fn get_reviews(&self, id: &str) -> Result<Option<LocationReviews>, StoreError> {
        Ok(self
            .locations
            .read()
            .await
            .get(id)
            .map(Location::reviews_projection))
    }

    async fn save_details(&self, details: LocationDetails) -> Result<LocationDetails, StoreError> {
        schema::validate_details(&details.name, &details.opening_times)?;

        let mut locations = self.locations.write().await;
        let stored = locations
            .get_mut(&details.id)
            .ok_or_else(|| StoreError::NotFound {
                id: details.id.clone(),
            })?;

        stored.name.clone_from(&details.name);
        stored.address.clone_from(&details.address);
        stored.facilities.clone_from(&details.facilities);
        stored.coords = details.coords;
        stored.opening_times.clone_from(&details.opening_times);

        Ok(details)
    }

    async fn save_reviews(
        &self,
        mut reviews: LocationReviews,
    ) -> Result<LocationReviews, StoreError> {
        schema::validate_reviews(&reviews.reviews)?;

        let mut locations = self.locations.write().await;
        let stored = locations
            .get_mut(&reviews.id)
            .ok_or_else(|| StoreError::NotFound {
                id: reviews.id.clone(),
            })?;

        assign_review_ids(&mut reviews);
        stored.reviews.clone_from(&reviews.reviews);

        Ok(reviews)
    }

    async fn set_rating(&self, id: &str, rating: i32) -> Result<(), StoreError> {
        let mut locations = self.locations.write().await;
        let stored = locations
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        stored.rating = rating;
        Ok(())
    }

    async fn delete_location(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.locations.write().await.remove(id).is_some())
    }

    async fn nearest_locations(
        &self,
        origin: GeoCoordinate,
        query: NearQuery,
    ) -> Result<Vec<NearestHit>, StoreError> {
        let candidates: Vec<Location> = self.locations.read().await.values().cloned().collect();
        Ok(nearest::rank(origin, candidates, query))
    }
}
