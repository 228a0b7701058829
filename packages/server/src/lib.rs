#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the collision map dashboard.
//!
//! The aggregate table and boundary polygons are built once by
//! [`AppState::load`] and never change afterwards; every request reads them
//! through shared [`Arc`]s. The metric selector of the front-end calls
//! `/api/choropleth`, which is a thin wrapper around the pure
//! [`render::render_choropleth`]. Front-end files are served from the
//! configured static directory.

pub mod config;
mod handlers;
pub mod render;
#[cfg(test)]
mod test_fixtures;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use collision_map_aggregate::{AggregateError, AggregateTable, ProgressCallback, load_aggregates};
use collision_map_collision_models::{Variant, ZipNormalization};
use collision_map_geography::{BoundarySet, GeoError, reconcile};
use collision_map_geography_models::UnmatchedZip;

use crate::config::DashboardConfig;

/// Errors that prevent the dashboard from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The collision file could not be loaded.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// The boundary file could not be loaded.
    #[error(transparent)]
    Geography(#[from] GeoError),
}

/// Shared, read-only application state.
pub struct AppState {
    /// Per-ZIP collision aggregates.
    pub table: Arc<AggregateTable>,
    /// ZIP boundary polygons.
    pub boundaries: Arc<BoundarySet>,
    /// Aggregated ZIP codes with no boundary polygon.
    pub unmatched: Arc<Vec<UnmatchedZip>>,
    /// Metric set offered to the user.
    pub variant: Variant,
    /// ZIP cleaning policy the table was built with.
    pub zip_normalization: ZipNormalization,
}

impl AppState {
    /// Wraps a built table and boundary set, reconciling the two.
    #[must_use]
    pub fn new(
        table: AggregateTable,
        boundaries: BoundarySet,
        variant: Variant,
        zip_normalization: ZipNormalization,
    ) -> Self {
        let unmatched = reconcile(&table, &boundaries);
        Self {
            table: Arc::new(table),
            boundaries: Arc::new(boundaries),
            unmatched: Arc::new(unmatched),
            variant,
            zip_normalization,
        }
    }

    /// Loads both input files named by `config` and builds the state.
    ///
    /// This is the one-time initialization step; nothing in the state is
    /// recomputed afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError`] if either input file cannot be loaded.
    pub fn load(
        config: &DashboardConfig,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Self, StartupError> {
        let table = load_aggregates(
            &config.collisions_path,
            config.zip_normalization,
            progress,
        )?;
        let boundaries = BoundarySet::load(&config.boundaries_path, &config.zip_property)?;
        Ok(Self::new(
            table,
            boundaries,
            config.variant,
            config.zip_normalization,
        ))
    }
}

/// Registers the `/api` routes.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/metrics", web::get().to(handlers::metrics))
            .route("/choropleth", web::get().to(handlers::choropleth))
            .route("/aggregates", web::get().to(handlers::aggregates))
            .route("/unmatched", web::get().to(handlers::unmatched))
            .route("/summary", web::get().to(handlers::summary)),
    );
}

/// Starts the collision map API server.
///
/// This is a regular async function; the caller is responsible for
/// providing the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: &DashboardConfig, state: AppState) -> std::io::Result<()> {
    let state = web::Data::new(state);

    let static_dir: Option<PathBuf> = if config.static_dir.is_dir() {
        Some(config.static_dir.clone())
    } else {
        log::warn!(
            "Static directory {} not found; serving the API only",
            config.static_dir.display()
        );
        None
    };

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        let app = App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api);

        match &static_dir {
            Some(dir) => app.service(Files::new("/", dir.clone()).index_file("index.html")),
            None => app,
        }
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
