//! Dashboard configuration.
//!
//! [`DashboardConfig`] is read from a TOML file in which every key is
//! optional, then adjusted by the `BIND_ADDR` and `PORT` environment
//! variables. Example:
//!
//! ```toml
//! collisions_path = "data/Motor_Vehicle_Collisions_-_Crashes.csv"
//! boundaries_path = "data/ny_new_york_zip_codes_geo.min.json"
//! variant = "extended"
//! zip_normalization = "full"
//! port = 8050
//! ```

use std::path::{Path, PathBuf};

use collision_map_collision_models::{Variant, ZipNormalization};
use collision_map_geography_models::DEFAULT_ZIP_PROPERTY;
use serde::{Deserialize, Serialize};

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Everything needed to build the dashboard state and serve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Collision export (CSV).
    pub collisions_path: PathBuf,
    /// ZIP boundary polygons (`GeoJSON` `FeatureCollection`).
    pub boundaries_path: PathBuf,
    /// Feature property holding each polygon's ZIP code.
    pub zip_property: String,
    /// Which metric set to offer.
    pub variant: Variant,
    /// How raw ZIP code cells are cleaned.
    pub zip_normalization: ZipNormalization,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Directory of front-end files served at `/`.
    pub static_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            collisions_path: PathBuf::from("Motor_Vehicle_Collisions_-_Crashes.csv"),
            boundaries_path: PathBuf::from("ny_new_york_zip_codes_geo.min.json"),
            zip_property: DEFAULT_ZIP_PROPERTY.to_string(),
            variant: Variant::default(),
            zip_normalization: ZipNormalization::default(),
            bind_addr: "127.0.0.1".to_string(),
            port: 8050,
            static_dir: PathBuf::from("app/dist"),
        }
    }
}

impl DashboardConfig {
    /// Reads a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = parse_config_toml(&text)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Applies `BIND_ADDR` and `PORT` from the process environment.
    #[must_use]
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `BIND_ADDR` and `PORT` from `lookup`.
    ///
    /// An unparseable `PORT` is ignored with a warning.
    #[must_use]
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(bind_addr) = lookup("BIND_ADDR") {
            self.bind_addr = bind_addr;
        }
        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(e) => log::warn!("Ignoring invalid PORT '{port}': {e}"),
            }
        }
        self
    }
}

/// Parses a TOML config string into a [`DashboardConfig`].
///
/// # Errors
///
/// Returns [`ConfigError::Toml`] if the string is not valid TOML, holds a
/// value of the wrong type, or names an unknown key.
pub fn parse_config_toml(toml_str: &str) -> Result<DashboardConfig, ConfigError> {
    Ok(toml::de::from_str(toml_str)?)
}
