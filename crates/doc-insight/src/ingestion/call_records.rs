//! Call-detail-record CSV extractor: rows split into day and night calls

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use super::{run_blocking, Extractor};
use crate::error::{Error, Result};
use crate::types::{Cell, Payload, SourceKind, Table};

/// Column holding the call timestamp
pub const CALL_TIME_COLUMN: &str = "call_time";

/// Column added to every row with its [`TimeOfDay`] label
pub const TIME_OF_DAY_COLUMN: &str = "time_of_day";

/// Table of calls placed during the day
pub const DAY_TABLE: &str = "day_calls";

/// Table of calls placed at night
pub const NIGHT_TABLE: &str = "night_calls";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%Y/%m/%d %I:%M:%S %p",
    "%Y/%m/%d %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Part of the day a call was placed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TimeOfDay {
    /// 06:00 up to (not including) 18:00
    Day,
    Night,
    /// Timestamp did not parse
    Unknown,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        if (6..18).contains(&hour) {
            TimeOfDay::Day
        } else {
            TimeOfDay::Night
        }
    }

    /// Label a raw `call_time` value
    pub fn classify(raw: &str) -> Self {
        parse_timestamp(raw)
            .map(|ts| Self::from_hour(ts.hour()))
            .unwrap_or(TimeOfDay::Unknown)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeOfDay::Day => "Day",
            TimeOfDay::Night => "Night",
            TimeOfDay::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Parse a call timestamp in any of the accepted layouts.
///
/// RFC 3339 values keep their own wall-clock time; a bare date reads as midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Reads a CDR CSV and partitions it by time of day
#[derive(Debug, Clone, Copy, Default)]
pub struct CallRecordsExtractor;

#[async_trait]
impl Extractor for CallRecordsExtractor {
    fn kind(&self) -> SourceKind {
        SourceKind::CallRecords
    }

    async fn extract(&self, location: &str) -> Result<Payload> {
        let path = PathBuf::from(location);
        let origin = format!("call records '{}'", path.display());
        run_blocking(origin.clone(), move || read_call_records(&path, &origin)).await
    }
}

fn read_call_records(path: &Path, origin: &str) -> Result<Payload> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| Error::extraction(origin, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::extraction(origin, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let time_index = headers
        .iter()
        .position(|h| h == CALL_TIME_COLUMN)
        .ok_or_else(|| {
            Error::extraction(origin, format!("missing required column '{}'", CALL_TIME_COLUMN))
        })?;

    let mut columns = headers;
    columns.push(TIME_OF_DAY_COLUMN.to_string());

    let mut day = Vec::new();
    let mut night = Vec::new();
    let mut unknown = 0usize;

    for record in reader.records() {
        // Ragged records surface here as csv errors
        let record = record.map_err(|e| Error::extraction(origin, e))?;
        let label = TimeOfDay::classify(record.get(time_index).unwrap_or_default());

        let mut row: Vec<Cell> = record.iter().map(Cell::infer).collect();
        row.push(Cell::Text(label.to_string()));

        match label {
            TimeOfDay::Day => day.push(row),
            TimeOfDay::Night => night.push(row),
            TimeOfDay::Unknown => unknown += 1,
        }
    }

    if unknown > 0 {
        tracing::warn!(
            "{} call record(s) in {} have an unparseable {}",
            unknown,
            path.display(),
            CALL_TIME_COLUMN
        );
    }
    tracing::info!(
        "Read {} day and {} night call(s) from {}",
        day.len(),
        night.len(),
        path.display()
    );

    Ok(Payload::Tables(vec![
        Table::new(DAY_TABLE, columns.clone(), day),
        Table::new(NIGHT_TABLE, columns, night),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("calls.csv");
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn callers(table: &Table) -> Vec<String> {
        table.rows.iter().map(|r| r[0].to_string()).collect()
    }

    #[test]
    fn test_hour_boundaries() {
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(18), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
    }

    #[test]
    fn test_timestamp_layouts() {
        for raw in [
            "2024-03-01T14:05:00Z",
            "2024-03-01T14:05:00+02:00",
            "2024-03-01 14:05:00",
            "2024-03-01 14:05:00.250",
            "2024-03-01T14:05:00",
            "2024-03-01 14:05",
            "03/01/2024 14:05:00",
            "03/01/2024 14:05",
            "2024/03/01 14:05:00",
            "2024/03/01 14:05",
            "2024-03-01 02:05:00 PM",
            "2024/03/01 2:05 pm",
            "03/01/2024 02:05:00 PM",
            "03/01/2024 2:05 PM",
        ] {
            let ts = parse_timestamp(raw).unwrap_or_else(|| panic!("failed to parse {raw}"));
            assert_eq!(ts.hour(), 14, "{raw}");
        }
        assert_eq!(parse_timestamp("2024-03-01").unwrap().hour(), 0);
        assert_eq!(parse_timestamp("2024/03/01").unwrap().hour(), 0);
        assert_eq!(parse_timestamp("03/01/2024 12:30 AM").unwrap().hour(), 0);
        assert_eq!(parse_timestamp("03/01/2024 12:30 PM").unwrap().hour(), 12);
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[tokio::test]
    async fn test_partition_by_hour() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "caller,duration,call_time\n\
             h5,30,2024-03-01 05:59:00\n\
             h6,45,2024-03-01 06:00:00\n\
             h17,12,2024-03-01 17:30:00\n\
             h18,8,2024-03-01 18:00:00\n\
             h23,60,2024-03-01 23:10:00\n",
        );

        let payload = CallRecordsExtractor.extract(path.to_str().unwrap()).await.unwrap();
        assert_eq!(payload.table_names(), vec![DAY_TABLE, NIGHT_TABLE]);

        let day = payload.table(DAY_TABLE).unwrap();
        let night = payload.table(NIGHT_TABLE).unwrap();
        assert_eq!(callers(day), vec!["h6", "h17"]);
        assert_eq!(callers(night), vec!["h5", "h18", "h23"]);

        assert_eq!(day.columns, vec!["caller", "duration", "call_time", "time_of_day"]);
        assert_eq!(day.rows[0][1], Cell::Int(45));
        assert_eq!(day.rows[0][3], Cell::Text("Day".into()));
        assert_eq!(night.rows[0][3], Cell::Text("Night".into()));
    }

    #[tokio::test]
    async fn test_unparseable_time_in_neither_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "caller,call_time\na,2024-03-01 10:00\nb,not a time\nc,\n",
        );

        let payload = CallRecordsExtractor.extract(path.to_str().unwrap()).await.unwrap();
        let total: usize = [DAY_TABLE, NIGHT_TABLE]
            .iter()
            .map(|t| payload.table(t).unwrap().row_count())
            .sum();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_missing_call_time_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "caller,started\na,2024-03-01 10:00\n");

        let err = CallRecordsExtractor.extract(path.to_str().unwrap()).await.unwrap_err();
        match err {
            Error::Extraction { cause, .. } => assert!(cause.contains(CALL_TIME_COLUMN)),
            other => panic!("unexpected error: {other}"),
        }
    }
}
