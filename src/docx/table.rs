//! WordprocessingML table walker.
//!
//! Cell text follows what a word processor shows: paragraphs joined with a
//! newline, runs concatenated, tabs and breaks kept as `\t` and `\n`. Cells are
//! laid out on the table grid: a cell spanning several grid columns is repeated
//! once per column, and a vertically merged continuation cell repeats the text
//! of the cell above it.

use std::borrow::Cow;

use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;

use super::DocxError;
use crate::models::Row;

const TAG_DOCUMENT: &[u8] = b"document";
const TAG_TABLE: &[u8] = b"tbl";
const TAG_ROW: &[u8] = b"tr";
const TAG_CELL: &[u8] = b"tc";
const TAG_GRID_SPAN: &[u8] = b"gridSpan";
const TAG_VERTICAL_MERGE: &[u8] = b"vMerge";
const TAG_PARAGRAPH: &[u8] = b"p";
const TAG_RUN: &[u8] = b"r";
const TAG_TEXT: &[u8] = b"t";
const TAG_TAB: &[u8] = b"tab";
const TAG_BREAK: &[u8] = b"br";
const TAG_CARRIAGE_RETURN: &[u8] = b"cr";

/// Text being collected for one `w:tc`.
#[derive(Default)]
struct CellText {
    paragraphs: Vec<String>,
    paragraph: String,
    span: usize,
    merged_from_above: bool,
}

impl CellText {
    fn new() -> Self {
        Self {
            span: 1,
            ..Default::default()
        }
    }
}

/// Walk the main document part and collect the rows of every top-level table.
pub(super) fn read_tables(xml: &[u8], part_name: &str) -> Result<Vec<Row>, DocxError> {
    let mut reader = Reader::from_reader(xml);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.expand_empty_elements = true;
    config.trim_text(false);

    let mut buffer = Vec::with_capacity(4096);
    let mut rows: Vec<Row> = Vec::new();
    let mut seen_root = false;

    // Table nesting depth; only depth 1 contributes rows and text.
    let mut depth = 0usize;
    let mut row: Option<Row> = None;
    let mut row_above: Row = Vec::new();
    let mut cell: Option<CellText> = None;
    let mut paragraph_depth = 0usize;
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        buffer.clear();
        match reader.read_event_into(&mut buffer)? {
            Event::Eof => break,
            Event::Start(event) => {
                let name = event.local_name();
                let name = name.as_ref();

                if !seen_root {
                    if name != TAG_DOCUMENT {
                        return Err(DocxError::NotWordDocument(part_name.to_string()));
                    }
                    seen_root = true;
                    continue;
                }

                if name == TAG_TABLE {
                    depth += 1;
                    if depth == 1 {
                        row_above.clear();
                    }
                    continue;
                }
                if depth != 1 {
                    continue;
                }

                match name {
                    TAG_ROW => row = Some(Vec::new()),
                    TAG_CELL => cell = Some(CellText::new()),
                    _ => {}
                }

                let Some(cell) = cell.as_mut() else {
                    continue;
                };
                match name {
                    TAG_GRID_SPAN => {
                        cell.span = attribute_value(&event, b"val")?
                            .and_then(|v| v.parse::<usize>().ok())
                            .unwrap_or(1)
                            .max(1);
                    }
                    TAG_VERTICAL_MERGE => {
                        cell.merged_from_above =
                            attribute_value(&event, b"val")?.as_deref() != Some("restart");
                    }
                    TAG_PARAGRAPH => {
                        paragraph_depth += 1;
                        if paragraph_depth == 1 {
                            cell.paragraph.clear();
                        }
                    }
                    TAG_RUN if paragraph_depth > 0 => run_depth += 1,
                    TAG_TEXT if run_depth > 0 => in_text = true,
                    TAG_TAB if run_depth > 0 => cell.paragraph.push('\t'),
                    TAG_BREAK | TAG_CARRIAGE_RETURN if run_depth > 0 => {
                        cell.paragraph.push('\n')
                    }
                    _ => {}
                }
            }
            Event::End(event) => {
                let name = event.local_name();
                let name = name.as_ref();

                if name == TAG_TABLE {
                    depth = depth.saturating_sub(1);
                    continue;
                }
                if depth != 1 {
                    continue;
                }

                match name {
                    TAG_TEXT => in_text = false,
                    TAG_RUN => run_depth = run_depth.saturating_sub(1),
                    TAG_PARAGRAPH => {
                        paragraph_depth = paragraph_depth.saturating_sub(1);
                        if paragraph_depth == 0 {
                            if let Some(cell) = cell.as_mut() {
                                let text = std::mem::take(&mut cell.paragraph);
                                cell.paragraphs.push(text);
                            }
                        }
                    }
                    TAG_CELL => {
                        if let (Some(finished), Some(row)) = (cell.take(), row.as_mut()) {
                            push_cell(row, &row_above, finished);
                        }
                        paragraph_depth = 0;
                        run_depth = 0;
                        in_text = false;
                    }
                    TAG_ROW => {
                        if let Some(finished) = row.take() {
                            row_above = finished.clone();
                            rows.push(finished);
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(event) if in_text && depth == 1 => {
                if let Some(cell) = cell.as_mut() {
                    cell.paragraph.push_str(&event.xml_content()?);
                }
            }
            Event::CData(event) if in_text && depth == 1 => {
                if let Some(cell) = cell.as_mut() {
                    cell.paragraph.push_str(&event.xml_content()?);
                }
            }
            Event::GeneralRef(event) if in_text && depth == 1 => {
                if let Some(cell) = cell.as_mut() {
                    cell.paragraph.push_str(&resolve_reference(&event)?);
                }
            }
            _ => {}
        }
    }

    if !seen_root {
        return Err(DocxError::NotWordDocument(part_name.to_string()));
    }

    Ok(rows)
}

/// Append a finished cell to its row, once per spanned grid column.
fn push_cell(row: &mut Row, row_above: &Row, cell: CellText) {
    let text = if cell.merged_from_above {
        row_above.get(row.len()).cloned().unwrap_or_default()
    } else {
        cell.paragraphs.join("\n").trim().to_string()
    };

    for _ in 0..cell.span {
        row.push(text.clone());
    }
}

/// Resolve `&amp;`-style entities and numeric character references.
fn resolve_reference(reference: &BytesRef) -> Result<Cow<'static, str>, DocxError> {
    let raw = reference.xml_content()?;
    if let Some(number) = raw.strip_prefix('#') {
        let code = match number.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => number.parse::<u32>(),
        }
        .map_err(|_| DocxError::Entity(raw.to_string()))?;
        let character = char::from_u32(code).ok_or_else(|| DocxError::Entity(raw.to_string()))?;
        Ok(Cow::Owned(character.to_string()))
    } else if let Some(entity) = resolve_xml_entity(&raw) {
        Ok(Cow::Borrowed(entity))
    } else {
        Err(DocxError::Entity(raw.to_string()))
    }
}

/// Unescaped value of the attribute whose local name is `name`.
pub(super) fn attribute_value(
    event: &BytesStart,
    name: &[u8],
) -> Result<Option<String>, DocxError> {
    for attribute in event.attributes() {
        let attribute = attribute?;
        if attribute.key.local_name().as_ref() == name {
            return Ok(Some(attribute.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
