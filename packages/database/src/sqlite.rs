//! `SQLite` [`LocationStore`] backend.
//!
//! Each location is one row. Scalar fields get their own columns; the
//! facilities, opening times, and embedded reviews are stored as JSON text,
//! so a review mutation rewrites only the `reviews` column.

use std::path::Path;

use async_trait::async_trait;
use locator_location_models::{
    GeoCoordinate, Location, LocationDetails, LocationReviews, NearQuery, NearestHit, NewLocation,
};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};
use switchy_database_connection::init_sqlite_rusqlite;

use crate::{LocationStore, StoreError, assign_review_ids, nearest, new_id, schema};

/// Default path for the locations database.
pub const DEFAULT_DB_PATH: &str = "data/locations.db";

/// Location documents persisted in a `SQLite` database.
pub struct SqliteStore {
    db: Box<dyn Database>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and ensures the schema
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the parent directory cannot be created,
    /// the database cannot be opened, or schema creation fails.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = init_sqlite_rusqlite(Some(path)).map_err(|e| StoreError::Connection {
            message: e.to_string(),
        })?;

        ensure_schema(db.as_ref()).await?;
        log::info!("Opened locations database at {}", path.display());

        Ok(Self { db })
    }
}

/// Creates the locations table and its index if they don't already exist.
async fn ensure_schema(db: &dyn Database) -> Result<(), StoreError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS locations (
            id            TEXT PRIMARY KEY,
            name          TEXT NOT NULL,
            address       TEXT NOT NULL,
            facilities    TEXT NOT NULL,
            longitude     REAL NOT NULL,
            latitude      REAL NOT NULL,
            opening_times TEXT NOT NULL,
            reviews       TEXT NOT NULL DEFAULT '[]',
            rating        INTEGER NOT NULL DEFAULT 0
        )",
    )
    .await?;

    db.exec_raw("CREATE INDEX IF NOT EXISTS idx_locations_latitude ON locations (latitude)")
        .await?;

    Ok(())
}

#[async_trait]
impl LocationStore for SqliteStore {
    async fn create_location(&self, location: NewLocation) -> Result<Location, StoreError> {
        schema::validate_details(&location.name, &location.opening_times)?;

        let location = location.into_location(new_id());
        self.db
            .exec_raw_params(
                "INSERT INTO locations (
                    id, name, address, facilities, longitude, latitude,
                    opening_times, reviews, rating
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                &[
                    DatabaseValue::String(location.id.clone()),
                    DatabaseValue::String(location.name.clone()),
                    DatabaseValue::String(location.address.clone()),
                    DatabaseValue::String(serde_json::to_string(&location.facilities)?),
                    DatabaseValue::Real64(location.coords.longitude()),
                    DatabaseValue::Real64(location.coords.latitude()),
                    DatabaseValue::String(serde_json::to_string(&location.opening_times)?),
                    DatabaseValue::String(serde_json::to_string(&location.reviews)?),
                    DatabaseValue::Int64(i64::from(location.rating)),
                ],
            )
            .await?;

        Ok(location)
    }

    async fn get_location(&self, id: &str) -> Result<Option<Location>, StoreError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT * FROM locations WHERE id = $1",
                &[DatabaseValue::String(id.to_string())],
            )
            .await?;

        rows.first().map(row_to_location).transpose()
    }

    async fn get_details(&self, id: &str) -> Result<Option<LocationDetails>, StoreError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT id, name, address, facilities, longitude, latitude, opening_times
                 FROM locations WHERE id = $1",
                &[DatabaseValue::String(id.to_string())],
            )
            .await?;

        rows.first().map(row_to_details).transpose()
    }

    async fn get_reviews(&self, id: &str) -> Result<Option<LocationReviews>, StoreError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT id, name, rating, reviews FROM locations WHERE id = $1",
                &[DatabaseValue::String(id.to_string())],
            )
            .await?;

        rows.first().map(row_to_reviews).transpose()
    }

    async fn save_details(&self, details: LocationDetails) -> Result<LocationDetails, StoreError> {
        schema::validate_details(&details.name, &details.opening_times)?;

        let updated = self
            .db
            .exec_raw_params(
                "UPDATE locations SET
                    name = $1, address = $2, facilities = $3,
                    longitude = $4, latitude = $5, opening_times = $6
                 WHERE id = $7",
                &[
                    DatabaseValue::String(details.name.clone()),
                    DatabaseValue::String(details.address.clone()),
                    DatabaseValue::String(serde_json::to_string(&details.facilities)?),
                    DatabaseValue::Real64(details.coords.longitude()),
                    DatabaseValue::Real64(details.coords.latitude()),
                    DatabaseValue::String(serde_json::to_string(&details.opening_times)?),
                    DatabaseValue::String(details.id.clone()),
                ],
            )
            .await?;

        if updated == 0 {
            return Err(StoreError::NotFound { id: details.id });
        }

        Ok(details)
    }

    async fn save_reviews(
        &self,
        mut reviews: LocationReviews,
    ) -> Result<LocationReviews, StoreError> {
        schema::validate_reviews(&reviews.reviews)?;
        assign_review_ids(&mut reviews);

        let updated = self
            .db
            .exec_raw_params(
                "UPDATE locations SET reviews = $1 WHERE id = $2",
                &[
                    DatabaseValue::String(serde_json::to_string(&reviews.reviews)?),
                    DatabaseValue::String(reviews.id.clone()),
                ],
            )
            .await?;

        if updated == 0 {
            return Err(StoreError::NotFound { id: reviews.id });
        }

        Ok(reviews)
    }

    async fn set_rating(&self, id: &str, rating: i32) -> Result<(), StoreError> {
        let updated = self
            .db
            .exec_raw_params(
                "UPDATE locations SET rating = $1 WHERE id = $2",
                &[
                    DatabaseValue::Int64(i64::from(rating)),
                    DatabaseValue::String(id.to_string()),
                ],
            )
            .await?;

        if updated == 0 {
            return Err(StoreError::NotFound { id: id.to_string() });
        }

        Ok(())
    }

    async fn delete_location(&self, id: &str) -> Result<bool, StoreError> {
        let deleted = self
            .db
            .exec_raw_params(
                "DELETE FROM locations WHERE id = $1",
                &[DatabaseValue::String(id.to_string())],
            )
            .await?;

        Ok(deleted > 0)
    }

    async fn nearest_locations(
        &self,
        origin: GeoCoordinate,
        query: NearQuery,
    ) -> Result<Vec<NearestHit>, StoreError> {
        let (min_lat, max_lat) = nearest::latitude_band(origin, query.max_distance_meters);

        let rows = self
            .db
            .query_raw_params(
                "SELECT * FROM locations WHERE latitude BETWEEN $1 AND $2",
                &[DatabaseValue::Real64(min_lat), DatabaseValue::Real64(max_lat)],
            )
            .await?;

        let candidates = rows
            .iter()
            .map(row_to_location)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(nearest::rank(origin, candidates, query))
    }
}

fn conversion(column: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Conversion {
        message: format!("Failed to read column {column}: {e}"),
    }
}

fn read_coords(row: &Row) -> Result<GeoCoordinate, StoreError> {
    let longitude: f64 = row
        .to_value("longitude")
        .map_err(|e| conversion("longitude", e))?;
    let latitude: f64 = row
        .to_value("latitude")
        .map_err(|e| conversion("latitude", e))?;

    GeoCoordinate::new(longitude, latitude).map_err(|e| conversion("longitude/latitude", e))
}

fn read_rating(row: &Row) -> Result<i32, StoreError> {
    let rating: i64 = row.to_value("rating").map_err(|e| conversion("rating", e))?;
    i32::try_from(rating).map_err(|e| conversion("rating", e))
}

fn row_to_details(row: &Row) -> Result<LocationDetails, StoreError> {
    let facilities: String = row
        .to_value("facilities")
        .map_err(|e| conversion("facilities", e))?;
    let opening_times: String = row
        .to_value("opening_times")
        .map_err(|e| conversion("opening_times", e))?;

    Ok(LocationDetails {
        id: row.to_value("id").map_err(|e| conversion("id", e))?,
        name: row.to_value("name").map_err(|e| conversion("name", e))?,
        address: row
            .to_value("address")
            .map_err(|e| conversion("address", e))?,
        facilities: serde_json::from_str(&facilities)?,
        coords: read_coords(row)?,
        opening_times: serde_json::from_str(&opening_times)?,
    })
}

fn row_to_reviews(row: &Row) -> Result<LocationReviews, StoreError> {
    let reviews: String = row
        .to_value("reviews")
        .map_err(|e| conversion("reviews", e))?;

    Ok(LocationReviews {
        id: row.to_value("id").map_err(|e| conversion("id", e))?,
        name: row.to_value("name").map_err(|e| conversion("name", e))?,
        rating: read_rating(row)?,
        reviews: serde_json::from_str(&reviews)?,
    })
}

fn row_to_location(row: &Row) -> Result<Location, StoreError> {
    let details = row_to_details(row)?;
    let reviews = row_to_reviews(row)?;

    Ok(Location {
        id: details.id,
        name: details.name,
        address: details.address,
        facilities: details.facilities,
        coords: details.coords,
        opening_times: details.opening_times,
        reviews: reviews.reviews,
        rating: reviews.rating,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use locator_location_models::{OpeningPeriod, Review, ReviewFields};

    fn db_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("locator_sqlite_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        dir.join("locations.db")
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    fn new_location(name: &str, lng: f64, lat: f64) -> NewLocation {
        NewLocation {
            name: name.to_string(),
            address: "125 High Street, Reading, RG6 1PS".to_string(),
            facilities: vec!["Hot drinks".to_string(), "Premium wifi".to_string()],
            coords: GeoCoordinate::new(lng, lat).unwrap(),
            opening_times: vec![OpeningPeriod {
                days: "Saturday".to_string(),
                opening: "8:00am".to_string(),
                closing: "5:00pm".to_string(),
                closed: false,
            }],
        }
    }

    #[tokio::test]
    async fn create_and_read_back_full_document() {
        let path = db_path("roundtrip");
        let store = SqliteStore::open(&path).await.unwrap();

        let created = store
            .create_location(new_location("Starcups", -0.9690, 51.455))
            .await
            .unwrap();
        let loaded = store.get_location(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded, created);

        assert!(store.get_location("missing").await.unwrap().is_none());
        assert!(store.get_details("missing").await.unwrap().is_none());
        assert!(store.get_reviews("missing").await.unwrap().is_none());

        cleanup(&path);
    }

    #[tokio::test]
    async fn review_and_rating_writes_are_independent_of_details() {
        let path = db_path("projections");
        let store = SqliteStore::open(&path).await.unwrap();
        let created = store
            .create_location(new_location("Starcups", -0.9690, 51.455))
            .await
            .unwrap();

        let mut reviews = store.get_reviews(&created.id).await.unwrap().unwrap();
        reviews.reviews.push(Review::new(ReviewFields {
            author: "Simon Holmes".to_string(),
            rating: 5,
            review_text: "What a great place.".to_string(),
        }));
        let saved = store.save_reviews(reviews).await.unwrap();
        assert!(saved.reviews[0].id.is_some());
        store.set_rating(&created.id, 5).await.unwrap();

        let mut details = store.get_details(&created.id).await.unwrap().unwrap();
        details.address = "1 New Road".to_string();
        store.save_details(details).await.unwrap();

        let loaded = store.get_location(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.address, "1 New Road");
        assert_eq!(loaded.reviews, saved.reviews);
        assert_eq!(loaded.rating, 5);

        cleanup(&path);
    }

    #[test]
    fn unreadable_address_is_a_conversion_error() {
        let row = Row {
            columns: vec![
                ("id".to_string(), DatabaseValue::String("loc-1".to_string())),
                ("name".to_string(), DatabaseValue::String("Starcups".to_string())),
                ("address".to_string(), DatabaseValue::Int64(42)),
                ("facilities".to_string(), DatabaseValue::String("[]".to_string())),
                ("longitude".to_string(), DatabaseValue::Real64(-0.969)),
                ("latitude".to_string(), DatabaseValue::Real64(51.455)),
                ("opening_times".to_string(), DatabaseValue::String("[]".to_string())),
            ],
        };

        let result = row_to_details(&row);
        assert!(
            matches!(&result, Err(StoreError::Conversion { message }) if message.contains("address")),
            "{result:?}"
        );
    }

    #[tokio::test]
    async fn writes_to_missing_location_report_not_found() {
        let path = db_path("missing");
        let store = SqliteStore::open(&path).await.unwrap();

        let result = store.set_rating("missing", 3).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert!(!store.delete_location("missing").await.unwrap());

        cleanup(&path);
    }

    #[tokio::test]
    async fn nearest_locations_uses_band_and_radius() {
        let path = db_path("nearest");
        let store = SqliteStore::open(&path).await.unwrap();
        for (name, lat) in [("far", 51.700), ("mid", 51.465), ("near", 51.456)] {
            store
                .create_location(new_location(name, -0.9690, lat))
                .await
                .unwrap();
        }

        let origin = GeoCoordinate::new(-0.9690, 51.455).unwrap();
        let hits = store
            .nearest_locations(origin, NearQuery::LISTING)
            .await
            .unwrap();

        let names: Vec<&str> = hits.iter().map(|h| h.location.name.as_str()).collect();
        assert_eq!(names, vec!["near", "mid"]);

        cleanup(&path);
    }
}
