#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Collision CSV ingestion and per-ZIP aggregation.
//!
//! Reads the NYC motor-vehicle-collision export, normalizes each record's
//! ZIP code, drops records without one, and reduces the rest into an
//! [`AggregateTable`] of summed injury/fatality counts, crash totals and
//! per-crash averages.

pub mod normalize;
pub mod progress;
pub mod reader;
pub mod table;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use collision_map_collision_models::ZipNormalization;

pub use normalize::normalize_zip;
pub use progress::{NullProgress, ProgressCallback, null_progress};
pub use reader::{CollisionReader, read_collisions};
pub use table::{AggregateTable, ZipAggregator, aggregate_records};

/// Rows between progress updates while loading.
const PROGRESS_INTERVAL: u64 = 50_000;

/// Errors that can occur while loading and aggregating collisions.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// The collision file could not be opened.
    #[error("Failed to open {path}: {source}")]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("Missing required column '{column}'")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },

    /// A count cell is not a non-negative integer.
    #[error("Invalid value '{value}' for '{column}' on line {line}")]
    InvalidCount {
        /// 1-based line number of the record.
        line: u64,
        /// Column holding the bad value.
        column: String,
        /// The offending cell.
        value: String,
    },
}

/// Loads a collision CSV and aggregates it by ZIP code.
///
/// Records are folded into the aggregate as they are read, so the raw
/// table is never held in memory.
///
/// # Errors
///
/// Returns [`AggregateError`] if the file cannot be opened, is missing a
/// required column, or contains an invalid count.
pub fn load_aggregates(
    path: &Path,
    policy: ZipNormalization,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<AggregateTable, AggregateError> {
    let open_err = |source| AggregateError::Open {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(open_err)?;
    let total_bytes = file.metadata().map_err(open_err)?.len();

    log::info!("Loading collisions from {}", path.display());
    progress.set_total(total_bytes);
    progress.set_message(format!("Reading {}", path.display()));

    let mut reader = read_collisions(BufReader::new(file))?;
    let mut aggregator = ZipAggregator::new(policy);
    let mut rows: u64 = 0;

    while let Some(record) = reader.next() {
        aggregator.push(&record?);
        rows += 1;
        if rows % PROGRESS_INTERVAL == 0 {
            progress.set_position(reader.byte_position());
        }
    }

    let table = aggregator.finish();
    progress.finish(format!(
        "Aggregated {} collisions into {} ZIP codes",
        table.summary().records_read,
        table.len()
    ));

    log::info!(
        "Aggregated {} collisions into {} ZIP codes; {} had no ZIP code",
        table.summary().records_read,
        table.len(),
        table.summary().records_without_zip
    );

    Ok(table)
}
