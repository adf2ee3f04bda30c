use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::LoadError;
use super::loader::tidy_rows;
use super::Sheet;

/// A `<sheet>` of xl/workbook.xml resolved to its archive part
struct SheetEntry {
    name: String,
    part: String,
}

/// Cell being read: its column, its `t` attribute and the raw text of `<v>` / `<t>`
struct PendingCell {
    col: usize,
    kind: Option<String>,
    raw: String,
}

impl PendingCell {
    fn open(e: &BytesStart<'_>, next_col: usize) -> Self {
        let col = attribute(e, |k| k == b"r")
            .and_then(|r| column_index(&r))
            .unwrap_or(next_col);
        PendingCell {
            col,
            kind: attribute(e, |k| k == b"t"),
            raw: String::new(),
        }
    }

    fn resolve(self, shared: &[String]) -> String {
        match self.kind.as_deref() {
            Some("s") => self
                .raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| shared.get(idx).cloned())
                .unwrap_or_default(),
            Some("b") if self.raw.trim() == "1" => "TRUE".to_string(),
            Some("b") => "FALSE".to_string(),
            _ => self.raw,
        }
    }
}

/// Reads every sheet of an .xlsx workbook in tab order.
///
/// Values come through as stored: shared and inline strings as text, numbers as written
/// in the file, booleans as TRUE / FALSE. Formulas contribute their cached value.
pub(super) fn load_xlsx(path: &Path) -> Result<Vec<Sheet>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(|e| zip_error(path, e))?;

    let parts = workbook_relationships(&mut archive, path)?;
    let shared = shared_strings(&mut archive, path)?;
    let entries = sheet_entries(&mut archive, path, &parts)?;

    entries
        .iter()
        .map(|entry| {
            let mut rows = sheet_rows(&mut archive, path, &entry.part, &shared)?;
            tidy_rows(&mut rows);
            tracing::debug!(sheet = %entry.name, rows = rows.len(), "sheet parsed");
            Ok(Sheet::new(&entry.name, rows))
        })
        .collect()
}

fn zip_error(path: &Path, source: zip::result::ZipError) -> LoadError {
    LoadError::Zip { path: path.to_path_buf(), source }
}

fn xml_error(path: &Path, source: quick_xml::Error) -> LoadError {
    LoadError::Xml { path: path.to_path_buf(), source }
}

fn attribute(e: &BytesStart<'_>, matches: impl Fn(&[u8]) -> bool) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| matches(a.key.as_ref()))
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Zero-based column of a cell reference such as "AB12"
fn column_index(cell_ref: &str) -> Option<usize> {
    let letters: Vec<u8> = cell_ref.bytes().take_while(u8::is_ascii_alphabetic).collect();
    if letters.is_empty() {
        return None;
    }
    let col = letters
        .iter()
        .fold(0usize, |acc, b| acc * 26 + usize::from(b.to_ascii_uppercase() - b'A') + 1);
    Some(col - 1)
}

/// Relationship targets are relative to xl/ unless absolute
fn part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    }
}

// relationship id -> archive part
fn workbook_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &Path,
) -> Result<HashMap<String, String>, LoadError> {
    let mut parts = HashMap::new();
    let Ok(file) = archive.by_name("xl/_rels/workbook.xml.rels") else {
        return Ok(parts);
    };

    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf).map_err(|e| xml_error(path, e))? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attribute(e, |k| k == b"Id"), attribute(e, |k| k == b"Target")) {
                    parts.insert(id, part_path(&target));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(parts)
}

fn shared_strings<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &Path) -> Result<Vec<String>, LoadError> {
    let mut strings = Vec::new();
    let Ok(file) = archive.by_name("xl/sharedStrings.xml") else {
        return Ok(strings);
    };

    let mut xml = Reader::from_reader(BufReader::new(file));
    let mut buf = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    // phonetic runs repeat the reading of the text, not the text itself
    let mut in_phonetic = false;

    loop {
        match xml.read_event_into(&mut buf).map_err(|e| xml_error(path, e))? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_text = true,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(ref e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(ref t) if in_text && !in_phonetic => {
                current.push_str(&t.unescape().map_err(|e| xml_error(path, e))?);
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_text = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

fn sheet_entries<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &Path,
    parts: &HashMap<String, String>,
) -> Result<Vec<SheetEntry>, LoadError> {
    let file = archive.by_name("xl/workbook.xml").map_err(|e| zip_error(path, e))?;
    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(true);
    let mut buf = Vec::new();
    let mut entries = Vec::new();

    loop {
        match xml.read_event_into(&mut buf).map_err(|e| xml_error(path, e))? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"sheet" => {
                if let Some(name) = attribute(e, |k| k == b"name") {
                    let fallback = format!("xl/worksheets/sheet{}.xml", entries.len() + 1);
                    let part = attribute(e, |k| k.ends_with(b":id"))
                        .and_then(|id| parts.get(&id).cloned())
                        .unwrap_or(fallback);
                    entries.push(SheetEntry { name, part });
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(entries)
}

fn sheet_rows<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &Path,
    part: &str,
    shared: &[String],
) -> Result<Vec<Vec<String>>, LoadError> {
    let file = archive.by_name(part).map_err(|e| zip_error(path, e))?;
    let mut xml = Reader::from_reader(BufReader::new(file));
    let mut buf = Vec::new();

    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell: Option<PendingCell> = None;
    let mut in_value = false;

    loop {
        match xml.read_event_into(&mut buf).map_err(|e| xml_error(path, e))? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"c" => cell = Some(PendingCell::open(e, row.len())),
                b"v" | b"t" => in_value = cell.is_some(),
                _ => {}
            },
            Event::Text(ref t) if in_value => {
                if let Some(pending) = cell.as_mut() {
                    pending.raw.push_str(&t.unescape().map_err(|e| xml_error(path, e))?);
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    if let Some(pending) = cell.take() {
                        let col = pending.col;
                        if row.len() <= col {
                            row.resize(col + 1, String::new());
                        }
                        row[col] = pending.resolve(shared);
                    }
                }
                b"row" => rows.push(std::mem::take(&mut row)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(rows)
}
