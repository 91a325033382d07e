//! Calendar event entity.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::schedule::ParsedRow;

/// A calendar event derived from one schedule row.
///
/// The `uid` is assigned exactly once at construction and never changes:
/// it is both the round-trip key in the serialized document and the key
/// used to address the event resource on the remote server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub uid: String,
    pub summary: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub note: String,
    /// Always empty in this domain; kept so the serialized block carries
    /// an explicit LOCATION field.
    pub location: String,
}

impl CalendarEvent {
    /// Build an event from a validated row, assigning a fresh UID.
    pub fn build(row: ParsedRow) -> Self {
        CalendarEvent {
            uid: Uuid::new_v4().to_string(),
            summary: row.title,
            start: row.start,
            end: row.end,
            note: row.note,
            location: String::new(),
        }
    }

    /// Name of the resource addressing this event on the remote collection.
    pub fn resource_name(&self) -> String {
        format!("{}.ics", self.uid)
    }
}
