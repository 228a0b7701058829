//! HTTP handler functions for the collision map API.

use actix_web::{HttpResponse, web};
use collision_map_collision_models::Metric;
use collision_map_server_models::{
    ApiError, ApiHealth, ApiSummary, ChoroplethQueryParams, MetricOption, MetricsResponse,
};

use crate::AppState;
use crate::render::render_choropleth;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/metrics`
///
/// Returns the selector options offered by the running variant.
pub async fn metrics(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(MetricsResponse {
        variant: state.variant,
        default: state.variant.default_metric(),
        options: state
            .variant
            .metrics()
            .iter()
            .copied()
            .map(MetricOption::from)
            .collect(),
    })
}

/// `GET /api/choropleth`
///
/// Renders the choropleth for the `metric` query parameter, or for the
/// variant's default metric when it is omitted.
pub async fn choropleth(
    state: web::Data<AppState>,
    params: web::Query<ChoroplethQueryParams>,
) -> HttpResponse {
    let metric = match params.metric.as_deref().map(str::trim) {
        None | Some("") => state.variant.default_metric(),
        Some(raw) => match raw.parse::<Metric>() {
            Ok(metric) => metric,
            Err(_) => return bad_request(format!("Unknown metric '{raw}'")),
        },
    };

    match render_choropleth(metric, &state.table, &state.boundaries, state.variant) {
        Ok(spec) => HttpResponse::Ok().json(spec),
        Err(e) => {
            log::warn!("Rejected choropleth request: {e}");
            bad_request(e.to_string())
        }
    }
}

/// `GET /api/aggregates`
///
/// Returns the full per-ZIP aggregate table.
pub async fn aggregates(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.table.rows())
}

/// `GET /api/unmatched`
///
/// Lists aggregated ZIP codes that have no boundary polygon.
pub async fn unmatched(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.unmatched.as_slice())
}

/// `GET /api/summary`
pub async fn summary(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiSummary {
        variant: state.variant,
        zip_normalization: state.zip_normalization,
        dataset: state.table.summary().clone(),
        boundaries: state.boundaries.stats().clone(),
        unmatched_zip_codes: state.unmatched.len() as u64,
    })
}

fn bad_request(error: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiError { error })
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};
    use collision_map_collision_models::{Variant, ZipNormalization};

    use super::*;
    use crate::configure_api;
    use crate::test_fixtures::{sample_boundaries, sample_table};

    fn state(variant: Variant) -> web::Data<AppState> {
        web::Data::new(AppState::new(
            sample_table(),
            sample_boundaries(),
            variant,
            ZipNormalization::Full,
        ))
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = test::init_service(App::new().configure(configure_api)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn metrics_follow_variant() {
        let app = test::init_service(
            App::new()
                .app_data(state(Variant::Base))
                .configure(configure_api),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/metrics").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["variant"], "base");
        assert_eq!(body["default"], "NUMBER OF PERSONS INJURED");
        assert_eq!(body["options"].as_array().unwrap().len(), 8);
        assert_eq!(body["options"][0]["label"], "PERSONS INJURED");
        assert_eq!(body["options"][0]["value"], "NUMBER OF PERSONS INJURED");
    }

    #[actix_web::test]
    async fn choropleth_defaults_to_variant_metric() {
        let app = test::init_service(
            App::new()
                .app_data(state(Variant::Extended))
                .configure(configure_api),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/choropleth").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["metric"], "TOTAL CRASHES");
        assert_eq!(body["locations"], "ZIP CODE");
        assert_eq!(body["colorRange"], serde_json::json!([0.0, 2.0]));
        assert_eq!(body["geojson"]["type"], "FeatureCollection");
        assert_eq!(body["rows"].as_array().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn choropleth_accepts_labels_and_column_names() {
        let app = test::init_service(
            App::new()
                .app_data(state(Variant::Extended))
                .configure(configure_api),
        )
        .await;

        for query in [
            "metric=PERSONS+INJURED",
            "metric=NUMBER%20OF%20PERSONS%20INJURED",
        ] {
            let req = test::TestRequest::get()
                .uri(&format!("/api/choropleth?{query}"))
                .to_request();
            let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["metric"], "NUMBER OF PERSONS INJURED", "{query}");
            assert_eq!(body["rows"][0]["hoverLabel"], "3", "{query}");
        }
    }

    #[actix_web::test]
    async fn choropleth_rejects_unknown_and_unavailable_metrics() {
        let app = test::init_service(
            App::new()
                .app_data(state(Variant::Base))
                .configure(configure_api),
        )
        .await;

        for query in ["metric=BOGUS", "metric=TOTAL+CRASHES"] {
            let req = test::TestRequest::get()
                .uri(&format!("/api/choropleth?{query}"))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{query}");
        }
    }

    #[actix_web::test]
    async fn unmatched_lists_zip_without_boundary() {
        let app = test::init_service(
            App::new()
                .app_data(state(Variant::Extended))
                .configure(configure_api),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/unmatched").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(
            body,
            serde_json::json!([{ "zipCode": "99999", "totalCrashes": 1 }])
        );
    }

    #[actix_web::test]
    async fn summary_and_aggregates_describe_table() {
        let app = test::init_service(
            App::new()
                .app_data(state(Variant::Extended))
                .configure(configure_api),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/summary").to_request();
        let summary: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(summary["dataset"]["recordsRead"], 5);
        assert_eq!(summary["dataset"]["recordsWithoutZip"], 1);
        assert_eq!(summary["boundaries"]["zipCodes"], 3);
        assert_eq!(summary["unmatchedZipCodes"], 1);
        assert_eq!(summary["zipNormalization"], "full");

        let req = test::TestRequest::get().uri("/api/aggregates").to_request();
        let rows: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rows[0]["zipCode"], "10001");
        assert_eq!(rows[0]["personsInjured"], 3);
        assert_eq!(rows[0]["totalCrashes"], 2);
        assert_eq!(rows[0]["avgPersonsInjuredPerCrash"], 1.5);
    }
}
