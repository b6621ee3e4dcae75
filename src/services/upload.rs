//! Schedule upload: document in, persisted snapshot out.

use chrono::NaiveDate;
use thiserror::Error;

use crate::docx::{extract_tables, DocxError};
use crate::models::Schedule;
use crate::storage::{ScheduleStore, StoreError};

/// File extension accepted for upload.
pub const SUPPORTED_EXTENSION: &str = ".docx";

/// Date format of the first word of an upload's filename.
const FILENAME_DATE_FORMAT: &str = "%d.%m.%Y";

/// Errors that can occur while importing a document.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Only .docx files are supported")]
    UnsupportedFileType(String),

    #[error(transparent)]
    Parse(#[from] DocxError),

    #[error("time data '{token}' does not match format '{}'", FILENAME_DATE_FORMAT)]
    Date {
        token: String,
        source: chrono::ParseError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Import an uploaded timetable and make it the current schedule.
///
/// The filename must end in `.docx` and start with a `DD.MM.YYYY` date. The
/// previous snapshot is only replaced once the document and the date have both
/// been read successfully.
pub fn import_document(
    store: &ScheduleStore,
    filename: &str,
    content: &[u8],
) -> Result<Schedule, UploadError> {
    if !filename.ends_with(SUPPORTED_EXTENSION) {
        return Err(UploadError::UnsupportedFileType(filename.to_string()));
    }

    let schedule = extract_tables(content)?;
    let date = filename_date(filename)?;
    tracing::info!(
        "Imported {} ({} rows, dated {})",
        filename,
        schedule.len(),
        date.format("%Y-%m-%d")
    );

    store.save(&schedule)?;
    Ok(schedule)
}

/// Parse the leading whitespace-delimited word of a filename as a date.
fn filename_date(filename: &str) -> Result<NaiveDate, UploadError> {
    let token = filename.split_whitespace().next().unwrap_or_default();
    NaiveDate::parse_from_str(token, FILENAME_DATE_FORMAT).map_err(|source| UploadError::Date {
        token: token.to_string(),
        source,
    })
}
