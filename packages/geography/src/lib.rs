#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! ZIP boundary loading and aggregate reconciliation.
//!
//! Loads a `GeoJSON` `FeatureCollection` of ZIP code (ZCTA) polygons,
//! indexes the features by their ZIP property, and reports which
//! aggregated ZIP codes have no polygon to draw them with.

pub mod boundaries;
pub mod reconcile;

use std::path::PathBuf;

use thiserror::Error;

pub use boundaries::BoundarySet;
pub use reconcile::reconcile;

/// Errors that can occur during geography operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// The boundary file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] Box<geojson::Error>),

    /// Data conversion error.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
