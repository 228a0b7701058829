//! Collision CSV reader.
//!
//! Streams [`CollisionRecord`]s out of the NYC "Motor Vehicle Collisions -
//! Crashes" export. Only the crash date, ZIP code and the eight count
//! columns are read; every other column is ignored.

use std::io::Read;

use chrono::NaiveDate;
use collision_map_collision_models::{
    CRASH_DATE_COLUMN, CollisionCounts, CollisionRecord, Metric, ZIP_CODE_COLUMN,
};

use crate::AggregateError;
use crate::normalize::is_missing_token;

/// Positions of the columns we read within the header row.
struct ColumnIndex {
    crash_date: usize,
    zip_code: usize,
    counts: Vec<(Metric, usize)>,
}

impl ColumnIndex {
    fn new(headers: &csv::StringRecord) -> Result<Self, AggregateError> {
        let position = |column: &str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| AggregateError::MissingColumn {
                    column: column.to_string(),
                })
        };

        let crash_date = position(CRASH_DATE_COLUMN)?;
        let zip_code = position(ZIP_CODE_COLUMN)?;
        let counts = Metric::COUNTS
            .iter()
            .map(|metric| Ok((*metric, position(metric.column_name())?)))
            .collect::<Result<_, AggregateError>>()?;

        Ok(Self {
            crash_date,
            zip_code,
            counts,
        })
    }

    /// Builds a record from one row. Cells past the end of a short row
    /// read as missing.
    fn record(
        &self,
        row: &csv::StringRecord,
        line: u64,
    ) -> Result<CollisionRecord, AggregateError> {
        let mut counts = CollisionCounts::default();
        for (metric, idx) in &self.counts {
            let value = parse_count(row.get(*idx), line, *metric)?;
            if let Some(slot) = counts.get_mut(*metric) {
                *slot = value;
            }
        }

        Ok(CollisionRecord {
            crash_date: row.get(self.crash_date).and_then(parse_crash_date),
            zip_code: row
                .get(self.zip_code)
                .filter(|cell| !cell.is_empty())
                .map(str::to_string),
            counts,
        })
    }
}

/// Streaming reader over the rows of a collision export.
///
/// Yields one `Result` per data row. Iteration stops after the first
/// error is returned.
pub struct CollisionReader<R> {
    reader: csv::Reader<R>,
    columns: ColumnIndex,
    record: csv::StringRecord,
    failed: bool,
}

impl<R: Read> CollisionReader<R> {
    /// Reads the header row and checks that every required column exists.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::Csv`] if the header row cannot be read and
    /// [`AggregateError::MissingColumn`] if a required column is absent.
    pub fn new(input: R) -> Result<Self, AggregateError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(input);

        let columns = ColumnIndex::new(reader.headers()?)?;

        Ok(Self {
            reader,
            columns,
            record: csv::StringRecord::new(),
            failed: false,
        })
    }

    /// Byte offset of the reader within the input.
    #[must_use]
    pub fn byte_position(&self) -> u64 {
        self.reader.position().byte()
    }

    fn next_record(&mut self) -> Result<Option<CollisionRecord>, AggregateError> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }

        let line = self.record.position().map_or(0, csv::Position::line);
        self.columns.record(&self.record, line).map(Some)
    }
}

impl<R: Read> Iterator for CollisionReader<R> {
    type Item = Result<CollisionRecord, AggregateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_record() {
            Ok(record) => record.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Convenience constructor for [`CollisionReader`].
///
/// # Errors
///
/// See [`CollisionReader::new`].
pub fn read_collisions<R: Read>(input: R) -> Result<CollisionReader<R>, AggregateError> {
    CollisionReader::new(input)
}

/// Parses a count cell.
///
/// Blank and missing cells count as zero. Integral floats (`2.0`) are
/// accepted because the export is frequently re-saved by spreadsheet tools.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn parse_count(cell: Option<&str>, line: u64, metric: Metric) -> Result<u64, AggregateError> {
    let value = cell.map_or("", str::trim);
    if is_missing_token(value) {
        return Ok(0);
    }

    if let Ok(count) = value.parse::<u64>() {
        return Ok(count);
    }

    match value.parse::<f64>() {
        Ok(float)
            if float.is_finite()
                && float >= 0.0
                && float < u64::MAX as f64
                && float.fract() == 0.0 =>
        {
            Ok(float as u64)
        }
        _ => Err(AggregateError::InvalidCount {
            line,
            column: metric.column_name().to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parses a crash date in either `MM/DD/YYYY` or ISO 8601 form.
fn parse_crash_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%m/%d/%Y") {
        return Some(date);
    }
    value
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}
