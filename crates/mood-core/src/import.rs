//! Record and activity file parsers
//!
//! Parsing only checks shape (columns present, dates and numbers parse).
//! Domain rules such as the 1-10 value range are enforced by the analyzer
//! so bad upstream data surfaces as a validation error, not a silent drop.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ActivityKind, ActivityLog, MoodRecord};

/// On-disk format of a record or activity file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Csv,
    Json,
}

impl RecordFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown record format: {} (valid: csv, json)", s)),
        }
    }
}

/// Column lookup by header name, so column order does not matter
struct Columns {
    headers: StringRecord,
}

impl Columns {
    fn index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    fn required(&self, name: &str) -> Result<usize> {
        self.index(name)
            .ok_or_else(|| Error::Import(format!("Missing column: {}", name)))
    }
}

fn field<'r>(record: &'r StringRecord, idx: usize, line: u64, name: &str) -> Result<&'r str> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| Error::Import(format!("Line {}: missing {}", line, name)))
}

/// Parse a timestamp as RFC 3339, or as `YYYY-MM-DD HH:MM:SS` in UTC
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map(|dt| dt.and_utc())
        .map_err(|_| Error::Import(format!("Invalid timestamp: {}", s)))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| Error::Import(format!("Invalid date: {}", s)))
}

/// Parse mood records from CSV.
///
/// Header: `id,user_id,value,occurred_on,logged_at,note` (`note` optional)
pub fn parse_records_csv<R: Read>(reader: R) -> Result<Vec<MoodRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns {
        headers: rdr.headers()?.clone(),
    };
    let id_col = columns.required("id")?;
    let user_col = columns.required("user_id")?;
    let value_col = columns.required("value")?;
    let occurred_col = columns.required("occurred_on")?;
    let logged_col = columns.required("logged_at")?;
    let note_col = columns.index("note");

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let value_str = field(&record, value_col, line, "value")?;
        let value = value_str.parse::<i32>().map_err(|_| {
            Error::Import(format!("Line {}: invalid value: {}", line, value_str))
        })?;

        let note = note_col
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        records.push(MoodRecord {
            id: field(&record, id_col, line, "id")?.to_string(),
            user_id: field(&record, user_col, line, "user_id")?.to_string(),
            value,
            note,
            occurred_on: parse_date(field(&record, occurred_col, line, "occurred_on")?)?,
            logged_at: parse_timestamp(field(&record, logged_col, line, "logged_at")?)?,
        });
    }

    debug!(count = records.len(), "Parsed mood records from CSV");
    Ok(records)
}

/// Parse mood records from a JSON array
pub fn parse_records_json<R: Read>(reader: R) -> Result<Vec<MoodRecord>> {
    let records: Vec<MoodRecord> = serde_json::from_reader(reader)?;
    debug!(count = records.len(), "Parsed mood records from JSON");
    Ok(records)
}

/// Parse activity logs from CSV (header: `kind,occurred_at`)
pub fn parse_activities_csv<R: Read>(reader: R) -> Result<Vec<ActivityLog>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = Columns {
        headers: rdr.headers()?.clone(),
    };
    let kind_col = columns.required("kind")?;
    let at_col = columns.required("occurred_at")?;

    let mut logs = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let kind = field(&record, kind_col, line, "kind")?
            .parse::<ActivityKind>()
            .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?;

        logs.push(ActivityLog {
            kind,
            occurred_at: parse_timestamp(field(&record, at_col, line, "occurred_at")?)?,
        });
    }

    debug!(count = logs.len(), "Parsed activity logs from CSV");
    Ok(logs)
}

/// Parse activity logs from a JSON array
pub fn parse_activities_json<R: Read>(reader: R) -> Result<Vec<ActivityLog>> {
    let logs: Vec<ActivityLog> = serde_json::from_reader(reader)?;
    debug!(count = logs.len(), "Parsed activity logs from JSON");
    Ok(logs)
}

fn resolve_format(path: &Path, format: Option<RecordFormat>) -> Result<RecordFormat> {
    format.or_else(|| RecordFormat::from_path(path)).ok_or_else(|| {
        Error::Import(format!(
            "Cannot detect format of {} (use a .csv or .json extension)",
            path.display()
        ))
    })
}

/// Load mood records from a file, detecting the format from its extension
/// unless `format` is given
pub fn load_records(path: &Path, format: Option<RecordFormat>) -> Result<Vec<MoodRecord>> {
    let format = resolve_format(path, format)?;
    let reader = BufReader::new(File::open(path)?);
    match format {
        RecordFormat::Csv => parse_records_csv(reader),
        RecordFormat::Json => parse_records_json(reader),
    }
}

/// Load activity logs from a file
pub fn load_activities(path: &Path, format: Option<RecordFormat>) -> Result<Vec<ActivityLog>> {
    let format = resolve_format(path, format)?;
    let reader = BufReader::new(File::open(path)?);
    match format {
        RecordFormat::Csv => parse_activities_csv(reader),
        RecordFormat::Json => parse_activities_json(reader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    #[test]
    fn test_parse_records_csv() {
        let data = "id,user_id,value,occurred_on,logged_at,note\n\
                    m1,u1,7,2026-10-17,2026-10-17T21:15:00Z,good day\n\
                    m2,u1,3,2026-10-18,2026-10-18 08:00:00,\n";

        let records = parse_records_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value, 7);
        assert_eq!(records[0].note.as_deref(), Some("good day"));
        assert_eq!(
            records[0].occurred_on,
            NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
        );
        assert_eq!(
            records[1].logged_at,
            Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap()
        );
        assert!(records[1].note.is_none());
    }

    #[test]
    fn test_out_of_range_value_is_not_rejected_here() {
        let data = "id,user_id,value,occurred_on,logged_at\n\
                    m1,u1,42,2026-10-17,2026-10-17T21:15:00Z\n";
        let records = parse_records_csv(data.as_bytes()).unwrap();
        assert_eq!(records[0].value, 42);
        assert!(records[0].validate().is_err());
    }

    #[test]
    fn test_missing_column() {
        let data = "id,user_id,occurred_on,logged_at\nm1,u1,2026-10-17,2026-10-17T21:15:00Z\n";
        let result = parse_records_csv(data.as_bytes());
        assert!(matches!(result, Err(Error::Import(msg)) if msg.contains("value")));
    }

    #[test]
    fn test_bad_date_reports_line() {
        let data = "id,user_id,value,occurred_on,logged_at\n\
                    m1,u1,5,17/10/2026,2026-10-17T21:15:00Z\n";
        assert!(matches!(
            parse_records_csv(data.as_bytes()),
            Err(Error::Import(_))
        ));
    }

    #[test]
    fn test_parse_activities_csv() {
        let data = "kind,occurred_at\njournal,2026-10-18T07:00:00+02:00\nbreathing,2026-10-18T12:00:00Z\n";
        let logs = parse_activities_csv(data.as_bytes()).unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].kind, ActivityKind::Journal);
        assert_eq!(
            logs[0].occurred_at,
            Utc.with_ymd_and_hms(2026, 10, 18, 5, 0, 0).unwrap()
        );

        let bad = "kind,occurred_at\nyoga,2026-10-18T07:00:00Z\n";
        assert!(parse_activities_csv(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_load_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let mut file = File::create(&path).unwrap();
        write!(
            file,
            r#"[{{"id":"m1","user_id":"u1","value":6,"occurred_on":"2026-10-18","logged_at":"2026-10-18T09:00:00Z"}}]"#
        )
        .unwrap();

        let records = load_records(&path, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, 6);
        assert!(records[0].note.is_none());
    }

    #[test]
    fn test_unknown_extension_needs_explicit_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.txt");
        std::fs::write(&path, "kind,occurred_at\nmood,2026-10-18T09:00:00Z\n").unwrap();

        assert!(matches!(
            load_activities(&path, None),
            Err(Error::Import(_))
        ));
        let logs = load_activities(&path, Some(RecordFormat::Csv)).unwrap();
        assert_eq!(logs[0].kind, ActivityKind::Mood);
    }
}
