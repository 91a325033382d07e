//! Calendar document assembly.

use tracing::warn;

use crate::event::CalendarEvent;
use crate::schedule::{self, ScheduleRow};

/// Timezone label stamped on every generated document.
pub const CALENDAR_TIMEZONE: &str = "Asia/Shanghai";

/// A named collection of events for one source table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDocument {
    pub name: String,
    pub timezone: String,
    pub events: Vec<CalendarEvent>,
}

impl CalendarDocument {
    pub fn new(name: &str) -> Self {
        CalendarDocument {
            name: name.to_string(),
            timezone: CALENDAR_TIMEZONE.to_string(),
            events: Vec::new(),
        }
    }

    /// Assemble a document from raw rows.
    ///
    /// Never fails: malformed rows are dropped (logged with their index)
    /// and leave no trace in the document. Event order mirrors row order.
    /// Returns the document plus the number of dropped rows.
    pub fn from_rows(name: &str, rows: &[ScheduleRow]) -> (Self, usize) {
        let mut doc = CalendarDocument::new(name);
        let mut dropped = 0;

        for (index, row) in rows.iter().enumerate() {
            match schedule::parse_row(row) {
                Ok(parsed) => doc.events.push(CalendarEvent::build(parsed)),
                Err(e) => {
                    dropped += 1;
                    warn!(document = %doc.name, row = index, error = %e, "skipping row");
                }
            }
        }

        (doc, dropped)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
