//! Zip package access: relationship lookup and part reading.

use std::io::{Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use super::table::attribute_value;
use super::DocxError;

const PACKAGE_RELS: &str = "_rels/.rels";
const DEFAULT_MAIN_PART: &str = "word/document.xml";
const OFFICE_DOCUMENT_REL_SUFFIX: &str = "/officeDocument";

/// Find the main document part through the package relationships.
///
/// Falls back to the conventional `word/document.xml` when the package has no
/// relationships part or it names no office document.
pub(super) fn main_document_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<String, DocxError> {
    let rels = match read_part(archive, PACKAGE_RELS) {
        Ok(rels) => rels,
        Err(DocxError::MissingPart(_)) => return Ok(DEFAULT_MAIN_PART.to_string()),
        Err(e) => return Err(e),
    };

    let mut reader = Reader::from_reader(rels.as_slice());
    reader.config_mut().expand_empty_elements = true;
    let mut buffer = Vec::new();

    loop {
        buffer.clear();
        match reader.read_event_into(&mut buffer)? {
            Event::Eof => break,
            Event::Start(event) if event.local_name().as_ref() == b"Relationship" => {
                let is_main = attribute_value(&event, b"Type")?
                    .is_some_and(|kind| kind.ends_with(OFFICE_DOCUMENT_REL_SUFFIX));
                if !is_main {
                    continue;
                }
                if let Some(target) = attribute_value(&event, b"Target")? {
                    return Ok(target.trim_start_matches('/').to_string());
                }
            }
            _ => (),
        }
    }

    Ok(DEFAULT_MAIN_PART.to_string())
}

/// Largest decompressed part accepted from a package.
pub(super) const MAX_PART_BYTES: u64 = 64 * 1024 * 1024;

/// Read a whole part into memory.
pub(super) fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>, DocxError> {
    read_part_limited(archive, name, MAX_PART_BYTES)
}

/// Read a part, refusing anything that declares or inflates to more than `limit` bytes.
fn read_part_limited<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    limit: u64,
) -> Result<Vec<u8>, DocxError> {
    let file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Err(DocxError::MissingPart(name.to_string())),
        Err(e) => return Err(e.into()),
    };

    // The declared size comes from the uploader and is only a hint.
    if file.size() > limit {
        return Err(DocxError::PartTooLarge(name.to_string()));
    }

    let mut content = Vec::with_capacity(file.size() as usize);
    file.take(limit + 1).read_to_end(&mut content)?;
    if content.len() as u64 > limit {
        return Err(DocxError::PartTooLarge(name.to_string()));
    }
    Ok(content)
}
