//! HTTP handler functions for the locator API.
//!
//! Each handler maps [`ServiceError`] to the status codes of its own route;
//! the same error can produce different statuses on different routes.

use actix_web::{HttpResponse, web};
use locator_location::{Missing, ServiceError};
use locator_location_models::{LocationForm, ReviewFields};
use locator_server_models::{
    ApiError, ApiHealth, ApiMessage, ListQuery, LocationBody, ReviewBody,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/locations?lng=..&lat=..`
///
/// Lists up to ten locations within 20 km, nearest first.
pub async fn locations_list(
    state: web::Data<AppState>,
    params: web::Query<ListQuery>,
) -> HttpResponse {
    match state
        .locations
        .list_by_distance(params.lng.as_deref(), params.lat.as_deref())
        .await
    {
        Ok(summaries) => HttpResponse::Ok().json(summaries),
        Err(ServiceError::BadRequest { message }) => {
            HttpResponse::NotFound().json(ApiMessage::new(message))
        }
        Err(e) => {
            log::error!("Failed to list locations: {e}");
            HttpResponse::NotFound().json(ApiError::new(e.to_string()))
        }
    }
}

/// `POST /api/locations`
pub async fn locations_create(
    state: web::Data<AppState>,
    body: web::Json<LocationBody>,
) -> HttpResponse {
    match state
        .locations
        .create(LocationForm::from(body.into_inner()))
        .await
    {
        Ok(location) => HttpResponse::Created().json(location),
        Err(e @ ServiceError::InvalidCoordinate(_)) => {
            HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
        }
        Err(ServiceError::Validation(errors)) => {
            HttpResponse::InternalServerError().json(ApiError::new(errors))
        }
        Err(e) => internal_error("create location", &e),
    }
}

/// `GET /api/locations/{locationid}`
pub async fn locations_read_one(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    match state.locations.read_one(&path).await {
        Ok(location) => HttpResponse::Ok().json(location),
        Err(ServiceError::NotFound(missing)) => not_found(missing),
        Err(e) => internal_error("read location", &e),
    }
}

/// `PUT /api/locations/{locationid}`
pub async fn locations_update_one(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<LocationBody>,
) -> HttpResponse {
    update_location(&state, &path, LocationForm::from(body.into_inner())).await
}

/// `PUT /api/locations/`
pub async fn locations_update_no_id(state: web::Data<AppState>) -> HttpResponse {
    update_location(&state, "", LocationForm::default()).await
}

async fn update_location(state: &AppState, id: &str, form: LocationForm) -> HttpResponse {
    match state.locations.update_one(id, form).await {
        Ok(location) => HttpResponse::Ok().json(location),
        Err(ServiceError::NotFound(missing)) => not_found(missing),
        Err(e @ ServiceError::InvalidCoordinate(_)) => {
            HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
        }
        Err(ServiceError::Validation(errors)) => {
            HttpResponse::InternalServerError().json(ApiError::new(errors))
        }
        Err(e) => internal_error("update location", &e),
    }
}

/// `DELETE /api/locations/{locationid}`
pub async fn locations_delete_one(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    delete_location(&state, &path).await
}

/// `DELETE /api/locations/`
pub async fn locations_delete_no_id(state: web::Data<AppState>) -> HttpResponse {
    delete_location(&state, "").await
}

async fn delete_location(state: &AppState, id: &str) -> HttpResponse {
    match state.locations.delete_one(id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(ServiceError::NotFound(missing)) => not_found(missing),
        Err(e) => internal_error("delete location", &e),
    }
}

/// `POST /api/locations/{locationid}/reviews`
///
/// An unknown location is a client error here, not a 404.
pub async fn reviews_create(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ReviewBody>,
) -> HttpResponse {
    let fields = match ReviewFields::try_from(body.into_inner()) {
        Ok(fields) => fields,
        Err(errors) => return HttpResponse::BadRequest().json(ApiError::new(errors)),
    };

    match state.reviews.add_review(&path, fields).await {
        Ok(review) => HttpResponse::Created().json(review),
        Err(ServiceError::NotFound(Missing::LocationId)) => not_found(Missing::LocationId),
        Err(ServiceError::NotFound(missing)) => {
            HttpResponse::BadRequest().json(ApiMessage::new(missing.to_string()))
        }
        Err(ServiceError::Validation(errors)) => {
            HttpResponse::BadRequest().json(ApiError::new(errors))
        }
        Err(e) => internal_error("add review", &e),
    }
}

/// `GET /api/locations/{locationid}/reviews/{reviewid}`
pub async fn reviews_read_one(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (location_id, review_id) = path.into_inner();

    match state.reviews.read_one(&location_id, &review_id).await {
        Ok(found) => HttpResponse::Ok().json(found),
        Err(ServiceError::NotFound(missing)) => not_found(missing),
        Err(e) => internal_error("read review", &e),
    }
}

/// `PUT /api/locations/{locationid}/reviews/{reviewid}`
pub async fn reviews_update_one(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    body: web::Json<ReviewBody>,
) -> HttpResponse {
    let (location_id, review_id) = path.into_inner();

    let fields = match ReviewFields::try_from(body.into_inner()) {
        Ok(fields) => fields,
        Err(errors) => return HttpResponse::BadRequest().json(ApiError::new(errors)),
    };

    match state
        .reviews
        .update_review(&location_id, &review_id, fields)
        .await
    {
        Ok(review) => HttpResponse::Ok().json(review),
        Err(ServiceError::NotFound(missing)) => not_found(missing),
        Err(ServiceError::Validation(errors)) => {
            HttpResponse::BadRequest().json(ApiError::new(errors))
        }
        Err(e) => internal_error("update review", &e),
    }
}

/// `PUT /api/locations/{locationid}/reviews/`
pub async fn reviews_update_no_id() -> HttpResponse {
    not_found(Missing::ReviewIds)
}

/// `DELETE /api/locations/{locationid}/reviews/{reviewid}`
pub async fn reviews_delete_one(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (location_id, review_id) = path.into_inner();
    delete_review(&state, &location_id, &review_id).await
}

/// `DELETE /api/locations/{locationid}/reviews/`
pub async fn reviews_delete_no_id(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    delete_review(&state, &path, "").await
}

async fn delete_review(state: &AppState, location_id: &str, review_id: &str) -> HttpResponse {
    match state.reviews.delete_review(location_id, review_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(ServiceError::NotFound(missing)) => not_found(missing),
        Err(e) => {
            log::error!("Failed to delete review {review_id} of {location_id}: {e}");
            HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
        }
    }
}

fn not_found(missing: Missing) -> HttpResponse {
    HttpResponse::NotFound().json(ApiMessage::new(missing.to_string()))
}

fn internal_error(action: &str, e: &ServiceError) -> HttpResponse {
    log::error!("Failed to {action}: {e}");
    HttpResponse::InternalServerError().json(ApiError::new(e.to_string()))
}
