#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! ZIP boundary and reconciliation types.
//!
//! These types describe how aggregated ZIP codes relate to the boundary
//! polygons used to draw them. They are independent of the collision data
//! itself.

use serde::{Deserialize, Serialize};

/// Feature property holding the ZIP code in the Census ZCTA boundary files
/// (e.g. `ny_new_york_zip_codes_geo.min.json`).
pub const DEFAULT_ZIP_PROPERTY: &str = "ZCTA5CE10";

/// An aggregated ZIP code with no boundary polygon to draw it with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedZip {
    /// The normalized ZIP code.
    pub zip_code: String,
    /// Collisions recorded for the ZIP code, useful for judging how much
    /// data the map cannot show.
    pub total_crashes: u64,
}

/// Counts describing a loaded boundary file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryStats {
    /// Features in the collection.
    pub features: u64,
    /// Distinct ZIP keys found on those features.
    pub zip_codes: u64,
    /// Features skipped for lacking a usable ZIP property.
    pub features_without_zip: u64,
}
