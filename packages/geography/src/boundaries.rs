//! ZIP boundary feature collection.
//!
//! A [`BoundarySet`] owns the parsed `GeoJSON` (so it can be handed to the
//! map renderer unchanged) together with a sorted index of the ZIP codes
//! its features carry.

use std::collections::BTreeSet;
use std::path::Path;

use collision_map_geography_models::BoundaryStats;
use geojson::{FeatureCollection, GeoJson};

use crate::GeoError;

/// ZIP code polygons keyed by a feature property.
#[derive(Debug, Clone)]
pub struct BoundarySet {
    collection: FeatureCollection,
    keys: BTreeSet<String>,
    key_property: String,
    stats: BoundaryStats,
}

impl BoundarySet {
    /// Indexes an already-parsed feature collection.
    ///
    /// Features whose `key_property` is missing or not a string are kept in
    /// the collection but cannot be matched; keys are compared exactly, with
    /// no normalization.
    #[must_use]
    pub fn from_collection(collection: FeatureCollection, key_property: &str) -> Self {
        let mut keys = BTreeSet::new();
        let mut features_without_zip = 0_u64;

        for (idx, feature) in collection.features.iter().enumerate() {
            let Some(zip) = feature
                .property(key_property)
                .and_then(serde_json::Value::as_str)
            else {
                log::warn!("Boundary feature {idx} has no string '{key_property}' property");
                features_without_zip += 1;
                continue;
            };

            if !keys.insert(zip.to_string()) {
                log::debug!("Duplicate boundary feature for ZIP {zip}");
            }
        }

        let stats = BoundaryStats {
            features: collection.features.len() as u64,
            zip_codes: keys.len() as u64,
            features_without_zip,
        };

        Self {
            collection,
            keys,
            key_property: key_property.to_string(),
            stats,
        }
    }

    /// Parses a `GeoJSON` `FeatureCollection` document.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::GeoJson`] if the text is not valid `GeoJSON`, or
    /// [`GeoError::Conversion`] if it is not a `FeatureCollection`.
    pub fn from_geojson_str(text: &str, key_property: &str) -> Result<Self, GeoError> {
        let geojson = text.parse::<GeoJson>().map_err(Box::new)?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(GeoError::Conversion {
                message: "boundary file is not a GeoJSON FeatureCollection".to_string(),
            });
        };
        Ok(Self::from_collection(collection, key_property))
    }

    /// Reads and parses a boundary file.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Io`] if the file cannot be read, otherwise see
    /// [`Self::from_geojson_str`].
    pub fn load(path: &Path, key_property: &str) -> Result<Self, GeoError> {
        log::info!("Loading ZIP boundaries from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| GeoError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let set = Self::from_geojson_str(&text, key_property)?;
        log::info!(
            "Loaded {} boundary features covering {} ZIP codes",
            set.stats.features,
            set.stats.zip_codes
        );
        Ok(set)
    }

    /// Whether a polygon exists for `zip_code`.
    #[must_use]
    pub fn contains(&self, zip_code: &str) -> bool {
        self.keys.contains(zip_code)
    }

    /// ZIP codes with a polygon, ascending.
    pub fn zip_codes(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    #[must_use]
    pub const fn collection(&self) -> &FeatureCollection {
        &self.collection
    }

    #[must_use]
    pub fn key_property(&self) -> &str {
        &self.key_property
    }

    /// Path of the key within a feature, as choropleth renderers expect it
    /// (e.g. `properties.ZCTA5CE10`).
    #[must_use]
    pub fn feature_id_key(&self) -> String {
        format!("properties.{}", self.key_property)
    }

    #[must_use]
    pub const fn stats(&self) -> &BoundaryStats {
        &self.stats
    }
}
