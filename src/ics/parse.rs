//! ICS parsing using the icalendar crate's parser.

use chrono::NaiveDateTime;
use icalendar::parser::{read_calendar, unfold, Component};

use crate::document::{CalendarDocument, CALENDAR_TIMEZONE};
use crate::event::CalendarEvent;
use crate::schedule::DEFAULT_SUMMARY;

/// Parse a serialized document back into a [`CalendarDocument`].
///
/// Event blocks missing a UID or a parseable DTSTART/DTEND are skipped,
/// matching the writer which always emits them.
pub fn parse_document(content: &str) -> Option<CalendarDocument> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).ok()?;

    let name = calendar
        .properties
        .iter()
        .find(|p| p.name == "X-WR-CALNAME")
        .map(|p| p.val.to_string())
        .unwrap_or_default();

    let timezone = calendar
        .properties
        .iter()
        .find(|p| p.name == "X-WR-TIMEZONE")
        .map(|p| p.val.to_string())
        .unwrap_or_else(|| CALENDAR_TIMEZONE.to_string());

    let events = calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .filter_map(parse_vevent)
        .collect();

    Some(CalendarDocument {
        name,
        timezone,
        events,
    })
}

fn parse_vevent(vevent: &Component) -> Option<CalendarEvent> {
    let uid = vevent.find_prop("UID")?.val.to_string();

    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());

    let start = parse_floating(vevent.find_prop("DTSTART")?.val.as_ref())?;
    let end = parse_floating(vevent.find_prop("DTEND")?.val.as_ref())?;

    let note = vevent
        .find_prop("DESCRIPTION")
        .map(|p| p.val.to_string())
        .unwrap_or_default();

    let location = vevent
        .find_prop("LOCATION")
        .map(|p| p.val.to_string())
        .unwrap_or_default();

    Some(CalendarEvent {
        uid,
        summary,
        start,
        end,
        note,
        location,
    })
}

fn parse_floating(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()
}
