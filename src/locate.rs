//! Turning a resolved file and a positioning request into a cursor location.

use std::path::{Path, PathBuf};

use regex::RegexBuilder;
use serde::Serialize;

use crate::error::Error;
use crate::types::Positioning;

/// Where an editor should put the cursor. Line and column are 1-based;
/// `offset` and `selection` count characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// 1-based column of `offset`.
    pub column: usize,
    /// 1-based line of `offset`.
    pub line: usize,
    /// Character offset from the start of the file.
    pub offset: usize,
    /// File on disk.
    pub path: PathBuf,
    /// Length of the text to select, 0 for a plain cursor.
    pub selection: usize,
}

/// Read `path` and place the cursor according to `positioning`.
///
/// # Errors
///
/// Returns `Error::Io` if the file cannot be read,
/// or `Error::OffsetOutOfRange` if an offset lies past the end of the file.
pub fn locate(path: &Path, positioning: &Positioning) -> Result<Location, Error> {
    if *positioning == Positioning::None {
        return Ok(Location { column: 1, line: 1, offset: 0, path: path.to_path_buf(), selection: 0 });
    }
    let text = std::fs::read_to_string(path)?;
    return locate_in_text(path, &text, positioning);
}

/// Place the cursor within already-read `text`.
///
/// # Errors
///
/// Returns `Error::OffsetOutOfRange` if an offset lies past the end of `text`.
pub fn locate_in_text(path: &Path, text: &str, positioning: &Positioning) -> Result<Location, Error> {
    let (offset, selection) = match positioning {
        Positioning::None => (0, 0),
        Positioning::Offset(offset) => {
            let length = text.chars().count();
            if *offset > length {
                return Err(Error::OffsetOutOfRange { file: path.to_path_buf(), length, offset: *offset });
            }
            (*offset, 0)
        },
        Positioning::FindString(needle) => match find_case_insensitive(text, needle) {
            Some(found) => found,
            None => {
                tracing::warn!(file = %path.display(), needle = %needle, "text not found, opening at start");
                (0, 0)
            },
        },
    };

    let (line, column) = line_and_column(text, offset);
    return Ok(Location { column, line, offset, path: path.to_path_buf(), selection });
}

/// First case-insensitive occurrence of `needle`, as (char offset, char length).
fn find_case_insensitive(text: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    let (start, end) = match RegexBuilder::new(&regex::escape(needle)).case_insensitive(true).build() {
        Ok(pattern) => {
            let found = pattern.find(text)?;
            (found.start(), found.end())
        },
        // Oversized needles exceed the regex size limit; fall back to an exact search.
        Err(_) => {
            let start = text.find(needle)?;
            (start, start.saturating_add(needle.len()))
        },
    };
    let offset = text.get(..start)?.chars().count();
    let length = text.get(start..end)?.chars().count();
    return Some((offset, length));
}

/// 1-based line and column of a character offset.
fn line_and_column(text: &str, offset: usize) -> (usize, usize) {
    let mut line = 1_usize;
    let mut column = 1_usize;
    for c in text.chars().take(offset) {
        if c == '\n' {
            line = line.saturating_add(1);
            column = 1;
        } else {
            column = column.saturating_add(1);
        }
    }
    return (line, column);
}
