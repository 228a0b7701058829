#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the collision map server.
//!
//! These types are serialized to JSON for the presentation layer. They are
//! separate from the aggregate types to allow independent evolution of the
//! API contract.

use collision_map_collision_models::{
    DatasetSummary, Metric, MetricKind, Variant, ZipNormalization,
};
use collision_map_geography_models::BoundaryStats;
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Error body returned with 4xx/5xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub error: String,
}

/// One entry of the metric selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricOption {
    /// Text shown to the user.
    pub label: String,
    /// Column name sent back as the `metric` query parameter.
    pub value: Metric,
    /// Whether the metric is a raw count or a per-crash average.
    pub kind: MetricKind,
}

impl From<Metric> for MetricOption {
    fn from(metric: Metric) -> Self {
        Self {
            label: metric.label().to_string(),
            value: metric,
            kind: metric.kind(),
        }
    }
}

/// Response from the metrics endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    /// Which metric set the dashboard was started with.
    pub variant: Variant,
    /// Metric to select on first load.
    pub default: Metric,
    /// Selectable metrics, in display order.
    pub options: Vec<MetricOption>,
}

/// Query parameters for the choropleth endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoroplethQueryParams {
    /// Column name or label of the metric to color by. Defaults to the
    /// variant's default metric.
    pub metric: Option<String>,
}

/// The colored value for a single ZIP code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoroplethRow {
    /// Normalized ZIP code, matched against the boundary feature key.
    pub zip_code: String,
    /// Metric value; `None` for an average over zero crashes.
    pub value: Option<f64>,
    /// `value` formatted for the hover label.
    pub hover_label: Option<String>,
}

/// Everything a renderer needs to draw one choropleth.
///
/// Borrows the boundary collection from the shared state, so building a
/// spec never copies the geometry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoroplethSpec<'a> {
    /// Selected metric column.
    pub metric: Metric,
    /// Selector label of the metric.
    pub label: &'static str,
    /// Data column joined against the boundary features.
    pub locations: &'static str,
    /// Path of the join key within each boundary feature.
    pub feature_id_key: String,
    /// Per-ZIP values, ordered by ZIP code.
    pub rows: Vec<ChoroplethRow>,
    /// Boundary polygons. Omitted when the caller only wants the data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geojson: Option<&'a FeatureCollection>,
    /// Color range `[0, max]`; `None` lets the renderer auto-scale.
    pub color_range: Option<[f64; 2]>,
    /// Named continuous color scale.
    pub color_scale: &'static str,
    /// Map projection.
    pub projection: &'static str,
    /// Whether the view should zoom to the drawn locations.
    pub fit_bounds_to_locations: bool,
    /// Tick format for the color bar (`,` avoids SI abbreviations).
    pub colorbar_tick_format: &'static str,
    /// Hover template with `%{location}` and `%{z}` placeholders.
    pub hover_template: String,
}

/// Response from the summary endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSummary {
    pub variant: Variant,
    pub zip_normalization: ZipNormalization,
    pub dataset: DatasetSummary,
    pub boundaries: BoundaryStats,
    /// Aggregated ZIP codes with no boundary polygon.
    pub unmatched_zip_codes: u64,
}
