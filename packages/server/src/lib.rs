#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the locator application.
//!
//! Serves the REST API for locations and their reviews under `/api`. The
//! location store is opened once at startup, shared by every worker, and
//! released when the server stops.

pub mod config;
mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use locator_database::StoreError;
use locator_database::memory::MemoryStore;
use locator_database::sqlite::SqliteStore;
use locator_location::{LocationService, LocationStore, RecomputeMode, ReviewService};

use crate::config::{ServerConfig, StoreKind};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Location CRUD and distance listings.
    pub locations: LocationService,
    /// Review CRUD with rating recomputation.
    pub reviews: ReviewService,
}

impl AppState {
    /// Builds both services over the same store.
    #[must_use]
    pub fn new(store: Arc<dyn LocationStore>, recompute: RecomputeMode) -> Self {
        Self {
            locations: LocationService::new(store.clone()),
            reviews: ReviewService::new(store, recompute),
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/locations", web::get().to(handlers::locations_list))
            .route("/locations", web::post().to(handlers::locations_create))
            .route("/locations/", web::put().to(handlers::locations_update_no_id))
            .route("/locations/", web::delete().to(handlers::locations_delete_no_id))
            .route("/locations/{locationid}", web::get().to(handlers::locations_read_one))
            .route("/locations/{locationid}", web::put().to(handlers::locations_update_one))
            .route("/locations/{locationid}", web::delete().to(handlers::locations_delete_one))
            .route(
                "/locations/{locationid}/reviews",
                web::post().to(handlers::reviews_create),
            )
            .route(
                "/locations/{locationid}/reviews/",
                web::put().to(handlers::reviews_update_no_id),
            )
            .route(
                "/locations/{locationid}/reviews/",
                web::delete().to(handlers::reviews_delete_no_id),
            )
            .route(
                "/locations/{locationid}/reviews/{reviewid}",
                web::get().to(handlers::reviews_read_one),
            )
            .route(
                "/locations/{locationid}/reviews/{reviewid}",
                web::put().to(handlers::reviews_update_one),
            )
            .route(
                "/locations/{locationid}/reviews/{reviewid}",
                web::delete().to(handlers::reviews_delete_one),
            ),
    );
}

/// Opens the store selected by `config`.
///
/// # Errors
///
/// Returns [`StoreError`] if the `SQLite` database cannot be opened.
pub async fn open_store(config: &ServerConfig) -> Result<Arc<dyn LocationStore>, StoreError> {
    let store: Arc<dyn LocationStore> = match config.store {
        StoreKind::Sqlite => {
            log::info!("Opening SQLite store at {}...", config.database_path.display());
            Arc::new(SqliteStore::open(&config.database_path).await?)
        }
        StoreKind::Memory => {
            log::info!("Using in-memory store; data will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    Ok(store)
}

/// Starts the locator API server.
///
/// Reads [`ServerConfig`] from the environment, opens the location store,
/// and runs the Actix-Web HTTP server until it is stopped (actix-web
/// handles `SIGINT`/`SIGTERM`). This is a regular async function; the
/// caller provides the runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the store cannot be opened, or if
/// the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();
    log::debug!("Server configuration: {config:?}");

    let store = open_store(&config).await.map_err(std::io::Error::other)?;
    let state = web::Data::new(AppState::new(store, config.recompute));

    log::info!(
        "Starting server on {}:{} (rating recompute: {})",
        config.bind_addr,
        config.port,
        config.recompute
    );

    let server_state = state.clone();
    let result = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(server_state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await;

    drop(state);
    log::info!("Server stopped; location store released");

    result
}
