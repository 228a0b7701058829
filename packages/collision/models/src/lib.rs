#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Collision record, ZIP aggregate and metric types.
//!
//! This crate defines the shared vocabulary of the collision map: the raw
//! [`CollisionRecord`] read from the NYC crash export, the per-ZIP
//! [`ZipAggregate`] derived from it, and the [`Metric`] columns a user can
//! color the map by.

use std::ops::AddAssign;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Name of the ZIP code column, used as the join key for rendering.
pub const ZIP_CODE_COLUMN: &str = "ZIP CODE";

/// Name of the crash date column.
pub const CRASH_DATE_COLUMN: &str = "CRASH DATE";

/// The eight injury/fatality counts reported for a collision.
///
/// Used both for a single record and for the summed counts of a ZIP code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionCounts {
    pub persons_injured: u64,
    pub persons_killed: u64,
    pub pedestrians_injured: u64,
    pub pedestrians_killed: u64,
    pub cyclists_injured: u64,
    pub cyclists_killed: u64,
    pub motorists_injured: u64,
    pub motorists_killed: u64,
}

impl CollisionCounts {
    /// Returns the count backing `metric`, or `None` for metrics that are
    /// not raw counts.
    #[must_use]
    pub const fn get(&self, metric: Metric) -> Option<u64> {
        match metric {
            Metric::PersonsInjured => Some(self.persons_injured),
            Metric::PersonsKilled => Some(self.persons_killed),
            Metric::PedestriansInjured => Some(self.pedestrians_injured),
            Metric::PedestriansKilled => Some(self.pedestrians_killed),
            Metric::CyclistsInjured => Some(self.cyclists_injured),
            Metric::CyclistsKilled => Some(self.cyclists_killed),
            Metric::MotoristsInjured => Some(self.motorists_injured),
            Metric::MotoristsKilled => Some(self.motorists_killed),
            Metric::TotalCrashes
            | Metric::AvgPersonsInjuredPerCrash
            | Metric::AvgPersonsKilledPerCrash => None,
        }
    }

    /// Returns a mutable reference to the count backing `metric`.
    pub const fn get_mut(&mut self, metric: Metric) -> Option<&mut u64> {
        match metric {
            Metric::PersonsInjured => Some(&mut self.persons_injured),
            Metric::PersonsKilled => Some(&mut self.persons_killed),
            Metric::PedestriansInjured => Some(&mut self.pedestrians_injured),
            Metric::PedestriansKilled => Some(&mut self.pedestrians_killed),
            Metric::CyclistsInjured => Some(&mut self.cyclists_injured),
            Metric::CyclistsKilled => Some(&mut self.cyclists_killed),
            Metric::MotoristsInjured => Some(&mut self.motorists_injured),
            Metric::MotoristsKilled => Some(&mut self.motorists_killed),
            Metric::TotalCrashes
            | Metric::AvgPersonsInjuredPerCrash
            | Metric::AvgPersonsKilledPerCrash => None,
        }
    }
}

impl CollisionCounts {
    /// Adds `rhs` field by field, or returns `None` if any sum overflows.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Some(Self {
            persons_injured: self.persons_injured.checked_add(rhs.persons_injured)?,
            persons_killed: self.persons_killed.checked_add(rhs.persons_killed)?,
            pedestrians_injured: self.pedestrians_injured.checked_add(rhs.pedestrians_injured)?,
            pedestrians_killed: self.pedestrians_killed.checked_add(rhs.pedestrians_killed)?,
            cyclists_injured: self.cyclists_injured.checked_add(rhs.cyclists_injured)?,
            cyclists_killed: self.cyclists_killed.checked_add(rhs.cyclists_killed)?,
            motorists_injured: self.motorists_injured.checked_add(rhs.motorists_injured)?,
            motorists_killed: self.motorists_killed.checked_add(rhs.motorists_killed)?,
        })
    }
}

/// Saturates at `u64::MAX` instead of overflowing.
impl AddAssign for CollisionCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.persons_injured = self.persons_injured.saturating_add(rhs.persons_injured);
        self.persons_killed = self.persons_killed.saturating_add(rhs.persons_killed);
        self.pedestrians_injured = self
            .pedestrians_injured
            .saturating_add(rhs.pedestrians_injured);
        self.pedestrians_killed = self
            .pedestrians_killed
            .saturating_add(rhs.pedestrians_killed);
        self.cyclists_injured = self.cyclists_injured.saturating_add(rhs.cyclists_injured);
        self.cyclists_killed = self.cyclists_killed.saturating_add(rhs.cyclists_killed);
        self.motorists_injured = self.motorists_injured.saturating_add(rhs.motorists_injured);
        self.motorists_killed = self.motorists_killed.saturating_add(rhs.motorists_killed);
    }
}

/// A single reported collision, as read from the crash export.
///
/// The ZIP code is kept exactly as it appeared in the source; normalization
/// happens during aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionRecord {
    /// Raw ZIP code cell, `None` when the cell was absent.
    pub zip_code: Option<String>,
    /// Injury and fatality counts.
    pub counts: CollisionCounts,
    /// Date of the crash, when parseable.
    pub crash_date: Option<NaiveDate>,
}

/// Summed collision statistics for one ZIP code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipAggregate {
    /// Normalized ZIP code (unique across an aggregate table).
    pub zip_code: String,
    /// Summed injury and fatality counts.
    #[serde(flatten)]
    pub counts: CollisionCounts,
    /// Number of collisions that contributed to this aggregate.
    pub total_crashes: u64,
    /// Persons injured per crash. `None` when `total_crashes` is zero.
    pub avg_persons_injured_per_crash: Option<f64>,
    /// Persons killed per crash. `None` when `total_crashes` is zero.
    pub avg_persons_killed_per_crash: Option<f64>,
}

impl ZipAggregate {
    /// Builds an aggregate and derives its per-crash averages.
    #[must_use]
    pub fn new(zip_code: String, counts: CollisionCounts, total_crashes: u64) -> Self {
        Self {
            zip_code,
            avg_persons_injured_per_crash: per_crash(counts.persons_injured, total_crashes),
            avg_persons_killed_per_crash: per_crash(counts.persons_killed, total_crashes),
            counts,
            total_crashes,
        }
    }

    /// Returns the value of `metric` for this ZIP code as a float.
    ///
    /// Returns `None` only for averages of a ZIP code with no crashes.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn metric_value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::TotalCrashes => Some(self.total_crashes as f64),
            Metric::AvgPersonsInjuredPerCrash => self.avg_persons_injured_per_crash,
            Metric::AvgPersonsKilledPerCrash => self.avg_persons_killed_per_crash,
            _ => self.counts.get(metric).map(|count| count as f64),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn per_crash(count: u64, total_crashes: u64) -> Option<f64> {
    if total_crashes == 0 {
        return None;
    }
    Some(count as f64 / total_crashes as f64)
}

/// Bookkeeping about the rows that went into an aggregate table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    /// Total collision rows read from the source.
    pub records_read: u64,
    /// Rows discarded because their ZIP code was missing.
    pub records_without_zip: u64,
    /// Number of distinct ZIP codes in the table.
    pub zip_codes: u64,
    /// Earliest parseable crash date.
    pub first_crash_date: Option<NaiveDate>,
    /// Latest parseable crash date.
    pub last_crash_date: Option<NaiveDate>,
}

/// Whether a metric is a raw count or a derived per-crash rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    Count,
    Average,
}

/// A column the map can be colored by.
///
/// Parses from either the column name (`"NUMBER OF PERSONS INJURED"`) or
/// the dropdown label (`"PERSONS INJURED"`); displays as the column name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumString,
)]
pub enum Metric {
    #[serde(rename = "TOTAL CRASHES")]
    #[strum(serialize = "TOTAL CRASHES")]
    TotalCrashes,
    #[serde(rename = "NUMBER OF PERSONS INJURED")]
    #[strum(serialize = "NUMBER OF PERSONS INJURED", serialize = "PERSONS INJURED")]
    PersonsInjured,
    #[serde(rename = "NUMBER OF PERSONS KILLED")]
    #[strum(serialize = "NUMBER OF PERSONS KILLED", serialize = "PERSONS KILLED")]
    PersonsKilled,
    #[serde(rename = "NUMBER OF PEDESTRIANS INJURED")]
    #[strum(
        serialize = "NUMBER OF PEDESTRIANS INJURED",
        serialize = "PEDESTRIANS INJURED"
    )]
    PedestriansInjured,
    #[serde(rename = "NUMBER OF PEDESTRIANS KILLED")]
    #[strum(
        serialize = "NUMBER OF PEDESTRIANS KILLED",
        serialize = "PEDESTRIANS KILLED"
    )]
    PedestriansKilled,
    #[serde(rename = "NUMBER OF CYCLIST INJURED")]
    #[strum(serialize = "NUMBER OF CYCLIST INJURED", serialize = "CYCLIST INJURED")]
    CyclistsInjured,
    #[serde(rename = "NUMBER OF CYCLIST KILLED")]
    #[strum(serialize = "NUMBER OF CYCLIST KILLED", serialize = "CYCLIST KILLED")]
    CyclistsKilled,
    #[serde(rename = "NUMBER OF MOTORIST INJURED")]
    #[strum(serialize = "NUMBER OF MOTORIST INJURED", serialize = "MOTORIST INJURED")]
    MotoristsInjured,
    #[serde(rename = "NUMBER OF MOTORIST KILLED")]
    #[strum(serialize = "NUMBER OF MOTORIST KILLED", serialize = "MOTORIST KILLED")]
    MotoristsKilled,
    #[serde(rename = "AVG PERSONS INJURED PER CRASH")]
    #[strum(serialize = "AVG PERSONS INJURED PER CRASH")]
    AvgPersonsInjuredPerCrash,
    #[serde(rename = "AVG PERSONS KILLED PER CRASH")]
    #[strum(serialize = "AVG PERSONS KILLED PER CRASH")]
    AvgPersonsKilledPerCrash,
}

impl Metric {
    /// The eight raw count columns, in source column order.
    pub const COUNTS: &'static [Self] = &[
        Self::PersonsInjured,
        Self::PersonsKilled,
        Self::PedestriansInjured,
        Self::PedestriansKilled,
        Self::CyclistsInjured,
        Self::CyclistsKilled,
        Self::MotoristsInjured,
        Self::MotoristsKilled,
    ];

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::TotalCrashes,
            Self::PersonsInjured,
            Self::PersonsKilled,
            Self::PedestriansInjured,
            Self::PedestriansKilled,
            Self::CyclistsInjured,
            Self::CyclistsKilled,
            Self::MotoristsInjured,
            Self::MotoristsKilled,
            Self::AvgPersonsInjuredPerCrash,
            Self::AvgPersonsKilledPerCrash,
        ]
    }

    /// Column name in the source export and in the aggregate table.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::TotalCrashes => "TOTAL CRASHES",
            Self::PersonsInjured => "NUMBER OF PERSONS INJURED",
            Self::PersonsKilled => "NUMBER OF PERSONS KILLED",
            Self::PedestriansInjured => "NUMBER OF PEDESTRIANS INJURED",
            Self::PedestriansKilled => "NUMBER OF PEDESTRIANS KILLED",
            Self::CyclistsInjured => "NUMBER OF CYCLIST INJURED",
            Self::CyclistsKilled => "NUMBER OF CYCLIST KILLED",
            Self::MotoristsInjured => "NUMBER OF MOTORIST INJURED",
            Self::MotoristsKilled => "NUMBER OF MOTORIST KILLED",
            Self::AvgPersonsInjuredPerCrash => "AVG PERSONS INJURED PER CRASH",
            Self::AvgPersonsKilledPerCrash => "AVG PERSONS KILLED PER CRASH",
        }
    }

    /// Short label shown in the metric selector.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TotalCrashes => "TOTAL CRASHES",
            Self::PersonsInjured => "PERSONS INJURED",
            Self::PersonsKilled => "PERSONS KILLED",
            Self::PedestriansInjured => "PEDESTRIANS INJURED",
            Self::PedestriansKilled => "PEDESTRIANS KILLED",
            Self::CyclistsInjured => "CYCLIST INJURED",
            Self::CyclistsKilled => "CYCLIST KILLED",
            Self::MotoristsInjured => "MOTORIST INJURED",
            Self::MotoristsKilled => "MOTORIST KILLED",
            Self::AvgPersonsInjuredPerCrash => "AVG PERSONS INJURED PER CRASH",
            Self::AvgPersonsKilledPerCrash => "AVG PERSONS KILLED PER CRASH",
        }
    }

    #[must_use]
    pub const fn kind(self) -> MetricKind {
        match self {
            Self::AvgPersonsInjuredPerCrash | Self::AvgPersonsKilledPerCrash => {
                MetricKind::Average
            }
            _ => MetricKind::Count,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Which set of metrics the dashboard offers.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Variant {
    /// The eight raw counts, auto-scaled colors.
    Base,
    /// Raw counts plus total crashes and per-crash averages, with a color
    /// range anchored at zero.
    #[default]
    Extended,
}

impl Variant {
    /// Metrics offered by this variant, in selector order.
    #[must_use]
    pub const fn metrics(self) -> &'static [Metric] {
        match self {
            Self::Base => Metric::COUNTS,
            Self::Extended => Metric::all(),
        }
    }

    /// Metric selected when the dashboard first loads.
    #[must_use]
    pub const fn default_metric(self) -> Metric {
        match self {
            Self::Base => Metric::PersonsInjured,
            Self::Extended => Metric::TotalCrashes,
        }
    }

    #[must_use]
    pub fn offers(self, metric: Metric) -> bool {
        self.metrics().contains(&metric)
    }
}

/// How raw ZIP code cells are cleaned before grouping.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ZipNormalization {
    /// Strip all whitespace and any decimal suffix.
    #[default]
    Full,
    /// Strip a decimal suffix left over from numeric coercion (`10001.0`).
    DecimalSuffix,
    /// Strip embedded whitespace only (`"100 01 "`).
    Whitespace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_parses_from_column_name_and_label() {
        assert_eq!(
            "NUMBER OF PERSONS INJURED".parse::<Metric>().unwrap(),
            Metric::PersonsInjured
        );
        assert_eq!(
            "CYCLIST KILLED".parse::<Metric>().unwrap(),
            Metric::CyclistsKilled
        );
        assert_eq!(
            "TOTAL CRASHES".parse::<Metric>().unwrap(),
            Metric::TotalCrashes
        );
        assert!("PERSONS MAIMED".parse::<Metric>().is_err());
    }

    #[test]
    fn metric_displays_column_name() {
        assert_eq!(
            Metric::MotoristsKilled.to_string(),
            "NUMBER OF MOTORIST KILLED"
        );
    }

    #[test]
    fn metric_serializes_as_column_name() {
        for metric in Metric::all() {
            let json = serde_json::to_string(metric).unwrap();
            assert_eq!(json, format!("\"{}\"", metric.column_name()));
        }
    }

    #[test]
    fn only_averages_are_average_kind() {
        for metric in Metric::all() {
            let expected = matches!(
                metric,
                Metric::AvgPersonsInjuredPerCrash | Metric::AvgPersonsKilledPerCrash
            );
            assert_eq!(metric.kind() == MetricKind::Average, expected, "{metric}");
        }
    }

    #[test]
    fn base_variant_offers_only_counts() {
        assert_eq!(Variant::Base.metrics().len(), 8);
        assert!(!Variant::Base.offers(Metric::TotalCrashes));
        assert!(!Variant::Base.offers(Metric::AvgPersonsInjuredPerCrash));
        assert!(Variant::Base.offers(Variant::Base.default_metric()));
    }

    #[test]
    fn extended_variant_offers_everything() {
        assert_eq!(Variant::Extended.metrics().len(), 11);
        assert_eq!(Variant::Extended.default_metric(), Metric::TotalCrashes);
    }

    #[test]
    fn variant_and_normalization_parse_kebab_case() {
        assert_eq!("base".parse::<Variant>().unwrap(), Variant::Base);
        assert_eq!(
            "decimal-suffix".parse::<ZipNormalization>().unwrap(),
            ZipNormalization::DecimalSuffix
        );
        assert_eq!(ZipNormalization::Whitespace.to_string(), "whitespace");
    }

    #[test]
    fn aggregate_derives_averages() {
        let counts = CollisionCounts {
            persons_injured: 3,
            persons_killed: 1,
            ..CollisionCounts::default()
        };
        let agg = ZipAggregate::new("10001".to_string(), counts, 4);
        assert_eq!(agg.avg_persons_injured_per_crash, Some(0.75));
        assert_eq!(agg.avg_persons_killed_per_crash, Some(0.25));
        assert_eq!(agg.metric_value(Metric::TotalCrashes), Some(4.0));
        assert_eq!(agg.metric_value(Metric::PersonsInjured), Some(3.0));
    }

    #[test]
    fn checked_add_detects_overflow() {
        let big = CollisionCounts {
            cyclists_killed: u64::MAX,
            ..CollisionCounts::default()
        };
        let one = CollisionCounts {
            cyclists_killed: 1,
            persons_injured: 2,
            ..CollisionCounts::default()
        };
        assert_eq!(big.checked_add(one), None);
        assert_eq!(one.checked_add(one).map(|c| c.persons_injured), Some(4));

        let mut sum = big;
        sum += one;
        assert_eq!(sum.cyclists_killed, u64::MAX);
        assert_eq!(sum.persons_injured, 2);
    }

    #[test]
    fn aggregate_with_no_crashes_has_no_averages() {
        let agg = ZipAggregate::new("10001".to_string(), CollisionCounts::default(), 0);
        assert_eq!(agg.avg_persons_injured_per_crash, None);
        assert_eq!(agg.metric_value(Metric::AvgPersonsKilledPerCrash), None);
        assert_eq!(agg.metric_value(Metric::PersonsKilled), Some(0.0));
    }

    #[test]
    fn counts_add_assign_sums_every_field() {
        let mut total = CollisionCounts::default();
        for metric in Metric::COUNTS {
            let mut one = CollisionCounts::default();
            *one.get_mut(*metric).unwrap() = 2;
            total += one;
        }
        for metric in Metric::COUNTS {
            assert_eq!(total.get(*metric), Some(2), "{metric}");
        }
    }
}
