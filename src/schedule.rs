//! Row parsing for tabular schedule input.
//!
//! Each CSV row carries a title, a date, start/end times, and an optional
//! note. The date and times must combine under the fixed
//! `YYYY.MM.DD HH:MM` pattern; anything else drops the row.

use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;

/// Combined date + time pattern used by the schedule feed.
pub const DATETIME_FORMAT: &str = "%Y.%m.%d %H:%M";

/// Placeholder summary for rows without a title.
pub const DEFAULT_SUMMARY: &str = "No Summary";

/// One raw line from a schedule CSV.
///
/// Headers are the feed's original Chinese column names; English aliases
/// are accepted so hand-written files work too.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleRow {
    #[serde(rename = "标题", alias = "title", default)]
    pub title: Option<String>,
    #[serde(rename = "日期", alias = "date", default)]
    pub date: Option<String>,
    #[serde(rename = "开始时间", alias = "start", default)]
    pub start: Option<String>,
    #[serde(rename = "结束时间", alias = "end", default)]
    pub end: Option<String>,
    #[serde(rename = "备注", alias = "note", default)]
    pub note: Option<String>,
}

/// A row that survived validation, ready for event construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub note: String,
}

/// Why a row was dropped.
#[derive(Error, Debug)]
pub enum RowParseError {
    #[error("could not parse date/time '{0}'")]
    BadDateTime(String),

    #[error("start {start} is not before end {end}")]
    StartNotBeforeEnd {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Validate one row.
///
/// A missing title falls back to [`DEFAULT_SUMMARY`] and a missing note
/// normalizes to the empty string; a malformed date/time is an error and
/// the caller skips the row.
pub fn parse_row(row: &ScheduleRow) -> Result<ParsedRow, RowParseError> {
    let date = row.date.as_deref().unwrap_or("").trim();
    let start_time = row.start.as_deref().unwrap_or("00:00").trim();
    let end_time = row.end.as_deref().unwrap_or("00:00").trim();

    let start = parse_datetime(date, start_time)?;
    let end = parse_datetime(date, end_time)?;

    if start >= end {
        return Err(RowParseError::StartNotBeforeEnd { start, end });
    }

    let title = match row.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => DEFAULT_SUMMARY.to_string(),
    };

    let note = row.note.clone().unwrap_or_default();

    Ok(ParsedRow {
        title,
        start,
        end,
        note,
    })
}

fn parse_datetime(date: &str, time: &str) -> Result<NaiveDateTime, RowParseError> {
    let combined = format!("{} {}", date, time);
    NaiveDateTime::parse_from_str(&combined, DATETIME_FORMAT)
        .map_err(|_| RowParseError::BadDateTime(combined))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(title: &str, date: &str, start: &str, end: &str, note: &str) -> ScheduleRow {
        ScheduleRow {
            title: Some(title.to_string()),
            date: Some(date.to_string()),
            start: Some(start.to_string()),
            end: Some(end.to_string()),
            note: Some(note.to_string()),
        }
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn parses_valid_row() {
        let parsed = parse_row(&row("Math", "2025.03.10", "09:00", "10:30", "")).unwrap();

        assert_eq!(parsed.title, "Math");
        assert_eq!(parsed.start, dt(2025, 3, 10, 9, 0));
        assert_eq!(parsed.end, dt(2025, 3, 10, 10, 30));
        assert_eq!(parsed.note, "");
        assert!(parsed.start < parsed.end);
    }

    #[test]
    fn rejects_wrong_date_format() {
        let err = parse_row(&row("Math", "03/10/2025", "09:00", "10:30", "")).unwrap_err();
        assert!(matches!(err, RowParseError::BadDateTime(_)));
    }

    #[test]
    fn rejects_missing_date() {
        let mut r = row("Math", "", "09:00", "10:30", "");
        r.date = None;
        assert!(parse_row(&r).is_err());
    }

    #[test]
    fn rejects_start_not_before_end() {
        let err = parse_row(&row("Math", "2025.03.10", "10:30", "09:00", "")).unwrap_err();
        assert!(matches!(err, RowParseError::StartNotBeforeEnd { .. }));

        let err = parse_row(&row("Math", "2025.03.10", "09:00", "09:00", "")).unwrap_err();
        assert!(matches!(err, RowParseError::StartNotBeforeEnd { .. }));
    }

    #[test]
    fn missing_title_uses_placeholder() {
        let mut r = row("", "2025.03.10", "09:00", "10:30", "");
        assert_eq!(parse_row(&r).unwrap().title, DEFAULT_SUMMARY);

        r.title = None;
        assert_eq!(parse_row(&r).unwrap().title, DEFAULT_SUMMARY);
    }

    #[test]
    fn missing_note_normalizes_to_empty() {
        let mut r = row("Math", "2025.03.10", "09:00", "10:30", "x");
        r.note = None;
        assert_eq!(parse_row(&r).unwrap().note, "");
    }

    #[test]
    fn deserializes_feed_headers() {
        let data = "标题,日期,开始时间,结束时间,备注\nMath,2025.03.10,09:00,10:30,room 2\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<ScheduleRow> = reader.deserialize().map(Result::unwrap).collect();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title.as_deref(), Some("Math"));
        assert_eq!(rows[0].note.as_deref(), Some("room 2"));
    }

    #[test]
    fn deserializes_english_headers() {
        let data = "title,date,start,end,note\nPhysics,2025.03.11,14:00,15:00,\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<ScheduleRow> = reader.deserialize().map(Result::unwrap).collect();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title.as_deref(), Some("Physics"));
        assert_eq!(rows[0].note, None);
    }
}
