//! Location CRUD and distance listings.

use std::sync::Arc;

use locator_database::LocationStore;
use locator_location_models::{
    GeoCoordinate, Location, LocationForm, LocationSummary, NearQuery, NewLocation,
    split_facilities,
};

use crate::{Missing, ServiceError, require_id};

/// Message returned when a distance listing lacks usable coordinates.
pub const COORDINATES_REQUIRED: &str = "lng and lat query parameters are required";

/// Creates, reads, updates, deletes, and lists locations.
#[derive(Clone)]
pub struct LocationService {
    store: Arc<dyn LocationStore>,
}

impl std::fmt::Debug for LocationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationService").finish_non_exhaustive()
    }
}

impl LocationService {
    /// Creates a service backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn LocationStore>) -> Self {
        Self { store }
    }

    /// Stores a new location with a single opening period (the form's
    /// second period).
    ///
    /// Coordinates are validated before anything is written.
    ///
    /// # Errors
    ///
    /// * [`ServiceError::InvalidCoordinate`] if lng/lat are not finite
    ///   numbers
    /// * [`ServiceError::Validation`] if the store rejects the document
    /// * [`ServiceError::Persistence`] if the write fails
    pub async fn create(&self, form: LocationForm) -> Result<Location, ServiceError> {
        let coords = GeoCoordinate::parse(&form.lng, &form.lat)?;

        let location = self
            .store
            .create_location(NewLocation {
                name: form.name,
                address: form.address,
                facilities: split_facilities(&form.facilities),
                coords,
                opening_times: vec![form.second_period],
            })
            .await?;

        log::debug!("Created location {}", location.id);
        Ok(location)
    }

    /// Loads a full location.
    ///
    /// # Errors
    ///
    /// * [`ServiceError::NotFound`] if no location has this id
    /// * [`ServiceError::Persistence`] if the read fails
    pub async fn read_one(&self, id: &str) -> Result<Location, ServiceError> {
        let id = require_id(id, Missing::Location)?;
        self.store
            .get_location(id)
            .await?
            .ok_or(ServiceError::NotFound(Missing::Location))
    }

    /// Overwrites the details of a location and replaces its opening times
    /// with both periods from the form. Reviews and rating are untouched.
    ///
    /// # Errors
    ///
    /// * [`ServiceError::NotFound`] if `id` is blank or unknown
    /// * [`ServiceError::InvalidCoordinate`] if lng/lat are not finite
    ///   numbers
    /// * [`ServiceError::Validation`] if the store rejects the document
    /// * [`ServiceError::Persistence`] if a read or write fails
    pub async fn update_one(&self, id: &str, form: LocationForm) -> Result<Location, ServiceError> {
        let id = require_id(id, Missing::LocationId)?;

        let mut details = self
            .store
            .get_details(id)
            .await?
            .ok_or(ServiceError::NotFound(Missing::Location))?;

        details.name = form.name;
        details.address = form.address;
        details.facilities = split_facilities(&form.facilities);
        details.coords = GeoCoordinate::parse(&form.lng, &form.lat)?;
        details.opening_times = vec![form.first_period, form.second_period];

        self.store.save_details(details).await?;

        self.store
            .get_location(id)
            .await?
            .ok_or(ServiceError::NotFound(Missing::Location))
    }

    /// Deletes a location and its reviews. Deleting an unknown id succeeds.
    ///
    /// # Errors
    ///
    /// * [`ServiceError::NotFound`] if `id` is blank
    /// * [`ServiceError::Persistence`] if the delete fails
    pub async fn delete_one(&self, id: &str) -> Result<(), ServiceError> {
        let id = require_id(id, Missing::LocationId)?;

        if !self.store.delete_location(id).await? {
            log::debug!("Delete of unknown location {id}");
        }

        Ok(())
    }

    /// Lists up to 10 locations within 20 km of the given point, nearest
    /// first.
    ///
    /// # Errors
    ///
    /// * [`ServiceError::BadRequest`] if either coordinate is missing or
    ///   not a finite number
    /// * [`ServiceError::Persistence`] if the query fails
    pub async fn list_by_distance(
        &self,
        lng: Option<&str>,
        lat: Option<&str>,
    ) -> Result<Vec<LocationSummary>, ServiceError> {
        let origin = match (lng, lat) {
            (Some(lng), Some(lat)) => GeoCoordinate::parse(lng, lat).ok(),
            _ => None,
        }
        .ok_or_else(|| ServiceError::BadRequest {
            message: COORDINATES_REQUIRED.to_string(),
        })?;

        let hits = self
            .store
            .nearest_locations(origin, NearQuery::LISTING)
            .await?;

        Ok(hits.into_iter().map(LocationSummary::from).collect())
    }
}
