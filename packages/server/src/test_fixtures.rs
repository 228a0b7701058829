//! Small in-memory datasets shared by the server tests.

use collision_map_aggregate::{AggregateTable, aggregate_records, read_collisions};
use collision_map_collision_models::ZipNormalization;
use collision_map_geography::BoundarySet;
use collision_map_geography_models::DEFAULT_ZIP_PROPERTY;

const COLLISIONS: &str = "CRASH DATE,ZIP CODE,NUMBER OF PERSONS INJURED,\
NUMBER OF PERSONS KILLED,NUMBER OF PEDESTRIANS INJURED,NUMBER OF PEDESTRIANS KILLED,\
NUMBER OF CYCLIST INJURED,NUMBER OF CYCLIST KILLED,NUMBER OF MOTORIST INJURED,\
NUMBER OF MOTORIST KILLED
09/11/2021,10001,1,0,1,0,0,0,0,0
09/12/2021,10001 ,2,0,0,0,1,0,1,0
09/13/2021,10002,1,1,0,0,0,0,1,1
09/14/2021,99999,0,0,0,0,0,0,0,0
09/15/2021,,4,0,0,0,0,0,4,0
";

const BOUNDARIES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        { "type": "Feature", "properties": { "ZCTA5CE10": "10001" }, "geometry": null },
        { "type": "Feature", "properties": { "ZCTA5CE10": "10002" }, "geometry": null },
        { "type": "Feature", "properties": { "ZCTA5CE10": "10003" }, "geometry": null }
    ]
}"#;

pub fn sample_table() -> AggregateTable {
    let records: Vec<_> = read_collisions(COLLISIONS.as_bytes())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    aggregate_records(&records, ZipNormalization::Full)
}

pub fn sample_boundaries() -> BoundarySet {
    BoundarySet::from_geojson_str(BOUNDARIES, DEFAULT_ZIP_PROPERTY).unwrap()
}
