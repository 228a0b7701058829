//! Choropleth rendering requests.
//!
//! [`render_choropleth`] is the whole contract between the dashboard core
//! and whatever draws the map: given a selected metric and the read-only
//! state, it returns a [`ChoroplethSpec`]. It has no side effects, so any
//! number of requests can run against the same state at once.

use collision_map_aggregate::AggregateTable;
use collision_map_collision_models::{Metric, MetricKind, Variant, ZIP_CODE_COLUMN};
use collision_map_geography::BoundarySet;
use collision_map_server_models::{ChoroplethRow, ChoroplethSpec};

const COLOR_SCALE: &str = "reds";
const PROJECTION: &str = "mercator";
const COLORBAR_TICK_FORMAT: &str = ",";

/// Errors returned for a rendering request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The metric exists but the running variant does not offer it.
    #[error("Metric '{metric}' is not available in the {variant} variant")]
    MetricUnavailable {
        /// Requested metric.
        metric: Metric,
        /// Variant the dashboard runs as.
        variant: Variant,
    },
}

/// Builds the choropleth for `metric`.
///
/// In the extended variant the color range is anchored at zero and ends at
/// the largest value of the metric; the base variant leaves scaling to the
/// renderer.
///
/// # Errors
///
/// Returns [`RenderError::MetricUnavailable`] if `variant` does not offer
/// `metric`.
pub fn render_choropleth<'a>(
    metric: Metric,
    table: &AggregateTable,
    boundaries: &'a BoundarySet,
    variant: Variant,
) -> Result<ChoroplethSpec<'a>, RenderError> {
    if !variant.offers(metric) {
        return Err(RenderError::MetricUnavailable { metric, variant });
    }

    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let value = row.metric_value(metric);
            ChoroplethRow {
                zip_code: row.zip_code.clone(),
                value,
                hover_label: value.map(|v| format_metric_value(metric, v)),
            }
        })
        .collect();

    let color_range = match variant {
        Variant::Base => None,
        Variant::Extended => Some([0.0, table.max_value(metric).unwrap_or(0.0)]),
    };

    Ok(ChoroplethSpec {
        metric,
        label: metric.label(),
        locations: ZIP_CODE_COLUMN,
        feature_id_key: boundaries.feature_id_key(),
        rows,
        geojson: Some(boundaries.collection()),
        color_range,
        color_scale: COLOR_SCALE,
        projection: PROJECTION,
        fit_bounds_to_locations: true,
        colorbar_tick_format: COLORBAR_TICK_FORMAT,
        hover_template: hover_template(metric),
    })
}

/// Hover template for `metric`: three decimals for averages, grouped
/// integers for counts.
#[must_use]
pub fn hover_template(metric: Metric) -> String {
    let format = match metric.kind() {
        MetricKind::Average => ".3f",
        MetricKind::Count => ",.0f",
    };
    format!(
        "<b>ZIP Code:</b> %{{location}}<br><b>{}:</b> %{{z:{format}}}<extra></extra>",
        metric.column_name()
    )
}

/// Formats a value the way its hover label displays it.
///
/// ```
/// use collision_map_collision_models::Metric;
/// use collision_map_server::render::format_metric_value;
///
/// assert_eq!(format_metric_value(Metric::AvgPersonsInjuredPerCrash, 0.5), "0.500");
/// assert_eq!(format_metric_value(Metric::TotalCrashes, 12345.0), "12,345");
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_metric_value(metric: Metric, value: f64) -> String {
    match metric.kind() {
        MetricKind::Average => format!("{value:.3}"),
        MetricKind::Count => {
            let rounded = value.round();
            let grouped = group_thousands(rounded.abs() as u64);
            if rounded < 0.0 {
                format!("-{grouped}")
            } else {
                grouped
            }
        }
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
