//! Group-by-ZIP aggregation.
//!
//! [`ZipAggregator`] folds collision records into per-ZIP sums as they
//! stream in, and [`AggregateTable`] is the finished, read-only result that
//! every rendering request shares.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use collision_map_collision_models::{
    CollisionCounts, CollisionRecord, DatasetSummary, Metric, ZipAggregate, ZipNormalization,
};

use crate::normalize::normalize_zip;

#[derive(Default)]
struct ZipAccumulator {
    counts: CollisionCounts,
    crashes: u64,
}

/// Incremental group-by over collision records.
pub struct ZipAggregator {
    policy: ZipNormalization,
    groups: BTreeMap<String, ZipAccumulator>,
    records_read: u64,
    records_without_zip: u64,
    first_crash_date: Option<NaiveDate>,
    last_crash_date: Option<NaiveDate>,
}

impl ZipAggregator {
    #[must_use]
    pub const fn new(policy: ZipNormalization) -> Self {
        Self {
            policy,
            groups: BTreeMap::new(),
            records_read: 0,
            records_without_zip: 0,
            first_crash_date: None,
            last_crash_date: None,
        }
    }

    /// Adds one record to its ZIP group, or counts it as dropped when its
    /// ZIP code normalizes to nothing.
    pub fn push(&mut self, record: &CollisionRecord) {
        self.records_read += 1;

        if let Some(date) = record.crash_date {
            self.first_crash_date = Some(self.first_crash_date.map_or(date, |d| d.min(date)));
            self.last_crash_date = Some(self.last_crash_date.map_or(date, |d| d.max(date)));
        }

        let Some(zip) = record
            .zip_code
            .as_deref()
            .and_then(|raw| normalize_zip(raw, self.policy))
        else {
            self.records_without_zip += 1;
            return;
        };

        let group = self.groups.entry(zip).or_default();
        if let Some(sum) = group.counts.checked_add(record.counts) {
            group.counts = sum;
        } else {
            log::warn!(
                "Count overflow for ZIP code {}; saturating at {}",
                record.zip_code.as_deref().unwrap_or_default(),
                u64::MAX
            );
            group.counts += record.counts;
        }
        group.crashes = group.crashes.saturating_add(1);
    }

    /// Finishes aggregation, deriving per-crash averages.
    #[must_use]
    pub fn finish(self) -> AggregateTable {
        let rows: Vec<ZipAggregate> = self
            .groups
            .into_iter()
            .map(|(zip, group)| ZipAggregate::new(zip, group.counts, group.crashes))
            .collect();

        let summary = DatasetSummary {
            records_read: self.records_read,
            records_without_zip: self.records_without_zip,
            zip_codes: rows.len() as u64,
            first_crash_date: self.first_crash_date,
            last_crash_date: self.last_crash_date,
        };

        log::debug!(
            "Aggregated {} records into {} ZIP codes ({} without a ZIP code)",
            summary.records_read,
            summary.zip_codes,
            summary.records_without_zip
        );

        AggregateTable { rows, summary }
    }
}

/// Aggregates a set of records in one call.
#[must_use]
pub fn aggregate_records<'a, I>(records: I, policy: ZipNormalization) -> AggregateTable
where
    I: IntoIterator<Item = &'a CollisionRecord>,
{
    let mut aggregator = ZipAggregator::new(policy);
    for record in records {
        aggregator.push(record);
    }
    aggregator.finish()
}

/// Per-ZIP collision statistics, ordered by ZIP code ascending.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateTable {
    rows: Vec<ZipAggregate>,
    summary: DatasetSummary,
}

impl AggregateTable {
    /// Builds a table from precomputed aggregates, sorting them by ZIP code.
    ///
    /// Later duplicates of a ZIP code are discarded.
    #[must_use]
    pub fn from_aggregates(mut rows: Vec<ZipAggregate>) -> Self {
        rows.sort_by(|a, b| a.zip_code.cmp(&b.zip_code));
        rows.dedup_by(|later, earlier| later.zip_code == earlier.zip_code);

        let summary = DatasetSummary {
            records_read: rows.iter().map(|r| r.total_crashes).sum(),
            records_without_zip: 0,
            zip_codes: rows.len() as u64,
            first_crash_date: None,
            last_crash_date: None,
        };

        Self { rows, summary }
    }

    #[must_use]
    pub fn rows(&self) -> &[ZipAggregate] {
        &self.rows
    }

    #[must_use]
    pub const fn summary(&self) -> &DatasetSummary {
        &self.summary
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up the aggregate for a normalized ZIP code.
    #[must_use]
    pub fn get(&self, zip_code: &str) -> Option<&ZipAggregate> {
        self.rows
            .binary_search_by(|row| row.zip_code.as_str().cmp(zip_code))
            .ok()
            .map(|idx| &self.rows[idx])
    }

    /// Largest value of `metric` across all ZIP codes, ignoring undefined
    /// averages. `None` when no ZIP code has a value.
    #[must_use]
    pub fn max_value(&self, metric: Metric) -> Option<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.metric_value(metric))
            .reduce(f64::max)
    }
}
