//! Data models for the timetable service.

mod lesson;
mod shift;

pub use lesson::Lesson;
pub use shift::{Shift, SLOT_NOT_FOUND};

/// One table row: cell texts in document order.
pub type Row = Vec<String>;

/// A full schedule snapshot: every table row of a document, tables concatenated.
pub type Schedule = Vec<Row>;
