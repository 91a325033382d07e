//! Convert tabular class schedules into calendar documents and keep a
//! remote CalDAV calendar in sync with them.
//!
//! The pipeline runs per input file: CSV rows become [`event::CalendarEvent`]s
//! collected into a [`document::CalendarDocument`], which is serialized to an
//! `.ics` artifact, handed to the storage/CDN collaborators, and finally
//! reconciled against the remote calendar with clear-then-replace semantics
//! by [`sync::sync_document`].

pub mod cdn;
pub mod config;
pub mod document;
pub mod error;
pub mod event;
pub mod ics;
pub mod pipeline;
pub mod remote;
pub mod schedule;
pub mod storage;
pub mod sync;

pub use error::{ClassdavError, ClassdavResult};
