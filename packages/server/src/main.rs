#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone entry point for the collision map API server.
//!
//! Reads its configuration from the TOML file named by
//! `COLLISION_MAP_CONFIG` (defaults apply when unset), then `BIND_ADDR`
//! and `PORT`.

use std::path::Path;

use collision_map_aggregate::null_progress;
use collision_map_server::config::DashboardConfig;
use collision_map_server::{AppState, run_server};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = match std::env::var("COLLISION_MAP_CONFIG") {
        Ok(path) => DashboardConfig::load(Path::new(&path))?,
        Err(_) => DashboardConfig::default(),
    }
    .apply_env_overrides();

    let state = AppState::load(&config, &null_progress())?;
    run_server(&config, state).await?;

    Ok(())
}
