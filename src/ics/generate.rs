//! ICS generation.

use icalendar::{Calendar, Component, EventLike, Property};

use crate::document::CalendarDocument;
use crate::event::CalendarEvent;

const PRODID: &str = "-//My Calendar Events//mxm.dk//";

/// Generate the .ics artifact for a whole document.
pub fn generate_document(doc: &CalendarDocument) -> String {
    let mut cal = calendar_shell(doc);
    for event in &doc.events {
        cal.push(vevent(event));
    }
    finalize(cal)
}

/// Generate a single-event .ics body, used as the upload payload during
/// sync. The event is wrapped in its own VCALENDAR with the document's
/// metadata so the server receives a self-contained object.
pub fn generate_event(doc: &CalendarDocument, event: &CalendarEvent) -> String {
    let mut cal = calendar_shell(doc);
    cal.push(vevent(event));
    finalize(cal)
}

fn calendar_shell(doc: &CalendarDocument) -> Calendar {
    let mut cal = Calendar::new();

    // X-WR-CALNAME / X-WR-TIMEZONE - de facto standard calendar metadata
    cal.append_property(Property::new("X-WR-CALNAME", &doc.name));
    cal.append_property(Property::new("X-WR-TIMEZONE", &doc.timezone));

    cal
}

fn vevent(event: &CalendarEvent) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&event.uid);
    ics_event.summary(&event.summary);

    // Floating local times; the document-level X-WR-TIMEZONE labels them.
    let dtstart = event.start.format("%Y%m%dT%H%M%S").to_string();
    let dtend = event.end.format("%Y%m%dT%H%M%S").to_string();
    ics_event.add_property("DTSTART", &dtstart);
    ics_event.add_property("DTEND", &dtend);

    // DESCRIPTION and LOCATION are always present, even when empty
    ics_event.description(&event.note);
    ics_event.location(&event.location);

    ics_event.done()
}

/// Render the calendar, swapping the icalendar crate's own PRODID for the
/// feed's.
fn finalize(mut cal: Calendar) -> String {
    let rendered = cal.done().to_string();
    let mut result = String::with_capacity(rendered.len());

    for line in rendered.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(PRODID);
        } else {
            result.push_str(line);
        }
        result.push_str("\r\n");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::CalendarEvent;
    use crate::schedule::ParsedRow;
    use chrono::NaiveDate;

    fn make_event(title: &str, note: &str) -> CalendarEvent {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        CalendarEvent::build(ParsedRow {
            title: title.to_string(),
            start: date.and_hms_opt(9, 0, 0).unwrap(),
            end: date.and_hms_opt(10, 30, 0).unwrap(),
            note: note.to_string(),
        })
    }

    fn make_document() -> CalendarDocument {
        let mut doc = CalendarDocument::new("2025p1");
        doc.events.push(make_event("Math", "bring calculator"));
        doc.events.push(make_event("Physics", ""));
        doc
    }

    #[test]
    fn document_carries_metadata_and_events() {
        let ics = generate_document(&make_document());

        assert!(ics.contains("PRODID:-//My Calendar Events//mxm.dk//"));
        assert!(ics.contains("X-WR-CALNAME:2025p1"));
        assert!(ics.contains("X-WR-TIMEZONE:Asia/Shanghai"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert!(ics.contains("SUMMARY:Math"));
        assert!(ics.contains("DTSTART:20250310T090000"));
        assert!(ics.contains("DTEND:20250310T103000"));
    }

    #[test]
    fn event_body_is_a_self_contained_calendar() {
        let doc = make_document();
        let ics = generate_event(&doc, &doc.events[0]);

        assert!(ics.starts_with("BEGIN:VCALENDAR"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains(&format!("UID:{}", doc.events[0].uid)));
    }

    #[test]
    fn empty_document_still_renders() {
        let doc = CalendarDocument::new("2025p1");
        let ics = generate_document(&doc);

        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(!ics.contains("BEGIN:VEVENT"));
    }
}
