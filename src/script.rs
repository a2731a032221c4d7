//! Overlay instruction files.
//!
//! One overlay per row: `start,end,text,x,y,font,font_size`. Fields may be quoted with `"` to
//! embed commas or line breaks; a row whose first field starts with `#` is a comment.

use std::fs::File;
use std::io::Read;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use crate::timecode::{Timecode, TimecodeError};

const FIELD_COUNT: usize = 7;
const COMMENT_MARKER: char = '#';

/// One text overlay, applied while the timeline cursor is inside `[start, end]`.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlaySpec {
    pub start: Timecode,
    pub end: Timecode,
    pub text: String,
    pub x: i32,
    pub y: i32,
    /// Bare font name (or absolute font file path), resolved by [`crate::fonts::FontResolver`].
    pub font: String,
    pub font_size: u32,
}

impl OverlaySpec {
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ScriptError {
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: malformed row: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("line {line}: expected 7 fields, found {found}")]
    FieldCount { line: u64, found: usize },

    #[error("line {line}: field '{field}' is not an integer: '{value}'")]
    NotInteger {
        line: u64,
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("line {line}: bad {field} time: {source}")]
    Time {
        line: u64,
        field: &'static str,
        #[source]
        source: TimecodeError,
    },
}

impl ScriptError {
    /// 1-based line of the offending row, when known.
    pub fn line(&self) -> Option<u64> {
        match self {
            Self::Read { .. } => None,
            Self::Csv { line, .. }
            | Self::FieldCount { line, .. }
            | Self::NotInteger { line, .. }
            | Self::Time { line, .. } => Some(*line),
        }
    }
}

/// Parse an instruction file into overlays, in file order.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn parse_script_file(path: impl AsRef<Path>) -> Result<Vec<OverlaySpec>, ScriptError> {
    let path = path.as_ref();
    tracing::info!("parsing overlay script");
    let f = File::open(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script_reader(f).map_err(|e| match e {
        ScriptError::Read { source, .. } => ScriptError::Read {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Parse instructions from any reader. The whole input is read before parsing starts.
pub fn parse_script_reader(mut r: impl Read) -> Result<Vec<OverlaySpec>, ScriptError> {
    let mut raw = String::new();
    r.read_to_string(&mut raw)
        .map_err(|source| ScriptError::Read {
            path: PathBuf::new(),
            source,
        })?;
    let normalized = skip_space_after_delimiters(&raw);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b',')
        .quote(b'"')
        .flexible(true)
        .from_reader(normalized.as_bytes());

    let mut overlays = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| ScriptError::Csv {
            line: source.position().map(|p| p.line()).unwrap_or(0),
            source,
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        tracing::debug!(line, row = ?record, "parsing row");

        if is_blank(&record) {
            continue;
        }
        if record
            .get(0)
            .is_some_and(|first| first.starts_with(COMMENT_MARKER))
        {
            continue;
        }

        let overlay = parse_row(line, &record)?;
        if overlay.end.seconds() < overlay.start.seconds() {
            tracing::warn!(
                line,
                start = %overlay.start,
                end = %overlay.end,
                "overlay ends before it starts and will never be shown"
            );
        }
        overlays.push(overlay);
    }

    tracing::info!(count = overlays.len(), "parsed overlay script");
    Ok(overlays)
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

fn parse_row(line: u64, record: &csv::StringRecord) -> Result<OverlaySpec, ScriptError> {
    if record.len() != FIELD_COUNT {
        return Err(ScriptError::FieldCount {
            line,
            found: record.len(),
        });
    }
    // Length checked above.
    let field = |i: usize| record.get(i).unwrap_or_default();

    let start = parse_time(line, "start", field(0))?;
    let end = parse_time(line, "end", field(1))?;
    let x = parse_int(line, "x", field(3))?;
    let y = parse_int(line, "y", field(4))?;
    let font_size = parse_int(line, "font_size", field(6))?;

    Ok(OverlaySpec {
        start,
        end,
        text: field(2).to_string(),
        x,
        y,
        font: field(5).trim().to_string(),
        font_size,
    })
}

fn parse_time(line: u64, field: &'static str, value: &str) -> Result<Timecode, ScriptError> {
    value
        .parse()
        .map_err(|source| ScriptError::Time { line, field, source })
}

fn parse_int<T>(line: u64, field: &'static str, value: &str) -> Result<T, ScriptError>
where
    T: std::str::FromStr<Err = ParseIntError>,
{
    value
        .trim()
        .parse()
        .map_err(|source| ScriptError::NotInteger {
            line,
            field,
            value: value.to_string(),
            source,
        })
}

/// Drop spaces that directly follow an unquoted delimiter, so `a, "b, c"` reads as two fields
/// with the second one quoted.
///
/// A `"` only opens a quoted field when it is the first character of the field. Anywhere else it
/// is literal, so a stray quote in a comment or unquoted text does not leak into later rows.
fn skip_space_after_delimiters(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_quotes = false;
    let mut field_start = true;
    let mut after_delimiter = false;
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            out.push(c);
            if c == '"' {
                // `""` inside a quoted field is an escaped quote.
                if chars.peek() == Some(&'"') {
                    out.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }
        if after_delimiter && c == ' ' {
            continue;
        }
        after_delimiter = c == ',';
        if c == '"' && field_start {
            in_quotes = true;
        }
        field_start = matches!(c, ',' | '\n' | '\r');
        out.push(c);
    }
    out
}
