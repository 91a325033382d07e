//! ICS document generation and parsing.
//!
//! One serialized document per source table, carrying the calendar name and
//! timezone label followed by one VEVENT block per event. Parsing is the
//! exact inverse so documents round-trip by UID with identical field values.

mod generate;
mod parse;

pub use generate::{generate_document, generate_event};
pub use parse::parse_document;
