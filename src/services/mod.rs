//! Service layer for timetable business logic.
//!
//! Services are shared by the web server and the CLI.

pub mod schedule;
pub mod upload;

pub use schedule::{LessonIds, QueryError, ScheduleService, NO_LESSONS_TEXT};
pub use upload::{import_document, UploadError, SUPPORTED_EXTENSION};
