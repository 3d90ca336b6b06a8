//! Fixtures shared by the service tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use locator_database::memory::MemoryStore;
use locator_database::{LocationStore, StoreError};
use locator_location_models::{
    GeoCoordinate, Location, LocationDetails, LocationForm, LocationReviews, NearQuery,
    NearestHit, NewLocation, OpeningPeriod, Review, ReviewFields,
};

pub fn fields(author: &str, rating: i32) -> ReviewFields {
    ReviewFields {
        author: author.to_string(),
        rating,
        review_text: format!("{author} says {rating} stars"),
    }
}

pub fn review(author: &str, rating: i32) -> Review {
    Review::new(fields(author, rating))
}

pub fn period(days: &str) -> OpeningPeriod {
    OpeningPeriod {
        days: days.to_string(),
        opening: "7:00am".to_string(),
        closing: "7:00pm".to_string(),
        closed: false,
    }
}

pub fn form(name: &str, lng: &str, lat: &str) -> LocationForm {
    LocationForm {
        name: name.to_string(),
        address: "125 High Street, Reading, RG6 1PS".to_string(),
        facilities: "Hot drinks, Food ,Premium wifi".to_string(),
        lng: lng.to_string(),
        lat: lat.to_string(),
        first_period: period("Monday - Friday"),
        second_period: period("Saturday"),
    }
}

/// Stores a location with reviews of the given ratings. The rating field
/// is left at zero.
pub async fn seed_location(store: &dyn LocationStore, ratings: &[i32]) -> String {
    let location = store
        .create_location(NewLocation {
            name: "Starcups".to_string(),
            address: "125 High Street, Reading, RG6 1PS".to_string(),
            facilities: vec!["Hot drinks".to_string()],
            coords: GeoCoordinate::new(-0.9690, 51.455).unwrap(),
            opening_times: vec![period("Monday - Friday")],
        })
        .await
        .unwrap();

    if !ratings.is_empty() {
        let mut projection = location.reviews_projection();
        for (i, rating) in ratings.iter().enumerate() {
            projection.reviews.push(review(&format!("author {i}"), *rating));
        }
        store.save_reviews(projection).await.unwrap();
    }

    location.id
}

/// Polls until the stored rating of a location equals `expected`.
pub async fn wait_for_rating(store: &dyn LocationStore, id: &str, expected: i32) -> bool {
    for _ in 0..100 {
        let rating = store.get_location(id).await.unwrap().map(|l| l.rating);
        if rating == Some(expected) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// A [`MemoryStore`] whose writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_review_saves: AtomicBool,
    fail_rating_writes: AtomicBool,
    rejected_rating_writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn fail_review_saves(&self, fail: bool) {
        self.fail_review_saves.store(fail, Ordering::SeqCst);
    }

    pub fn fail_rating_writes(&self, fail: bool) {
        self.fail_rating_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `set_rating` calls refused so far.
    pub fn rejected_rating_writes(&self) -> usize {
        self.rejected_rating_writes.load(Ordering::SeqCst)
    }

    /// Polls until at least `count` rating writes have been refused.
    pub async fn wait_for_rejected_rating_writes(&self, count: usize) -> bool {
        for _ in 0..100 {
            if self.rejected_rating_writes() >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    fn injected(what: &str) -> StoreError {
        StoreError::Connection {
            message: format!("injected {what} failure"),
        }
    }
}

#[async_trait]
impl LocationStore for FlakyStore {
    async fn create_location(&self, location: NewLocation) -> Result<Location, StoreError> {
        self.inner.create_location(location).await
    }

    async fn get_location(&self, id: &str) -> Result<Option<Location>, StoreError> {
        self.inner.get_location(id).await
    }

    async fn get_details(&self, id: &str) -> Result<Option<LocationDetails>, StoreError> {
        self.inner.get_details(id).await
    }

    async fn get_reviews(&self, id: &str) -> Result<Option<LocationReviews>, StoreError> {
        self.inner.get_reviews(id).await
    }

    async fn save_details(&self, details: LocationDetails) -> Result<LocationDetails, StoreError> {
        self.inner.save_details(details).await
    }

    async fn save_reviews(&self, reviews: LocationReviews) -> Result<LocationReviews, StoreError> {
        if self.fail_review_saves.load(Ordering::SeqCst) {
            return Err(Self::injected("review save"));
        }
        self.inner.save_reviews(reviews).await
    }

    async fn set_rating(&self, id: &str, rating: i32) -> Result<(), StoreError> {
        if self.fail_rating_writes.load(Ordering::SeqCst) {
            self.rejected_rating_writes.fetch_add(1, Ordering::SeqCst);
            return Err(Self::injected("rating write"));
        }
        self.inner.set_rating(id, rating).await
    }

    async fn delete_location(&self, id: &str) -> Result<bool, StoreError> {
        self.inner.delete_location(id).await
    }

    async fn nearest_locations(
        &self,
        origin: GeoCoordinate,
        query: NearQuery,
    ) -> Result<Vec<NearestHit>, StoreError> {
        self.inner.nearest_locations(origin, query).await
    }
}
