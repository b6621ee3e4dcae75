//! Table extraction from word-processor (.docx) documents.
//!
//! A .docx file is a zip package of XML parts. The package relationships name
//! the main document part; its body is walked and every top-level table is
//! flattened into rows of trimmed cell text. Everything outside tables
//! (paragraphs, headers, footers, images) is ignored.

mod package;
mod table;

use std::io::Cursor;

use thiserror::Error;
use zip::ZipArchive;

use crate::models::Schedule;

/// Errors that can occur while reading a document.
#[derive(Debug, Error)]
pub enum DocxError {
    #[error("Invalid document package: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("There is no item named '{0}' in the archive")]
    MissingPart(String),

    #[error("Part '{0}' is too large")]
    PartTooLarge(String),

    #[error("Part '{0}' is not a Word document")]
    NotWordDocument(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML encoding error: {0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Invalid XML entity: {0}")]
    Entity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extract every table row of a .docx document, in document order.
pub fn extract_tables(bytes: &[u8]) -> Result<Schedule, DocxError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let main_part = package::main_document_part(&mut archive)?;
    let xml = package::read_part(&mut archive, &main_part)?;

    let rows = table::read_tables(&xml, &main_part)?;
    tracing::debug!("Extracted {} table rows from {}", rows.len(), main_part);
    Ok(rows)
}
