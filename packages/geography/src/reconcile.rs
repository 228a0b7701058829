//! Cross-check of aggregated ZIP codes against boundary polygons.

use collision_map_aggregate::AggregateTable;
use collision_map_geography_models::UnmatchedZip;

use crate::BoundarySet;

/// Reports every aggregated ZIP code that has no boundary polygon.
///
/// Emits one warning per unmatched ZIP code. Neither input is modified;
/// unmatched ZIP codes stay in the table and are simply left uncolored
/// when rendered.
#[must_use]
pub fn reconcile(table: &AggregateTable, boundaries: &BoundarySet) -> Vec<UnmatchedZip> {
    let unmatched: Vec<UnmatchedZip> = table
        .rows()
        .iter()
        .filter(|row| !boundaries.contains(&row.zip_code))
        .map(|row| {
            log::warn!("Data for: {} but no GeoJSON", row.zip_code);
            UnmatchedZip {
                zip_code: row.zip_code.clone(),
                total_crashes: row.total_crashes,
            }
        })
        .collect();

    if unmatched.is_empty() {
        log::info!("All {} ZIP codes have a boundary polygon", table.len());
    } else {
        let crashes: u64 = unmatched.iter().map(|u| u.total_crashes).sum();
        log::info!(
            "{} of {} ZIP codes ({crashes} collisions) have no boundary polygon",
            unmatched.len(),
            table.len()
        );
    }

    unmatched
}

#[cfg(test)]
mod tests {
    use collision_map_collision_models::{CollisionCounts, ZipAggregate};
    use collision_map_geography_models::DEFAULT_ZIP_PROPERTY;

    use super::*;

    fn boundaries(zips: &[&str]) -> BoundarySet {
        let features: Vec<String> = zips
            .iter()
            .map(|zip| {
                format!(
                    r#"{{"type":"Feature","properties":{{"ZCTA5CE10":"{zip}"}},"geometry":null}}"#
                )
            })
            .collect();
        let doc = format!(
            r#"{{"type":"FeatureCollection","features":[{}]}}"#,
            features.join(",")
        );
        BoundarySet::from_geojson_str(&doc, DEFAULT_ZIP_PROPERTY).unwrap()
    }

    fn table(zips: &[&str]) -> AggregateTable {
        AggregateTable::from_aggregates(
            zips.iter()
                .map(|zip| ZipAggregate::new((*zip).to_string(), CollisionCounts::default(), 1))
                .collect(),
        )
    }

    #[test]
    fn reports_only_unmatched_zip() {
        let table = table(&["10001", "10002", "99999"]);
        let unmatched = reconcile(&table, &boundaries(&["10001", "10002", "10003"]));

        assert_eq!(
            unmatched,
            vec![UnmatchedZip {
                zip_code: "99999".to_string(),
                total_crashes: 1,
            }]
        );
    }

    #[test]
    fn fully_matched_table_reports_nothing() {
        let table = table(&["10001", "10002"]);
        assert!(reconcile(&table, &boundaries(&["10001", "10002"])).is_empty());
    }

    #[test]
    fn leaves_inputs_untouched() {
        let table = table(&["10001", "99999"]);
        let set = boundaries(&["10001"]);
        let before = table.clone();
        let _ = reconcile(&table, &set);
        assert_eq!(table, before);
        assert_eq!(set.stats().zip_codes, 1);
    }
}
