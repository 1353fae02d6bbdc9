use std::iter::Peekable;
use std::str::Chars;

use tracing::trace;

use crate::domain::FvError;

/// A parsed delimited-text document: rows of string cells plus the widest
/// row length observed during the scan. Rows keep their raw lengths; padding
/// up to `column_count` is left to consumers so the original shape stays
/// inspectable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    pub rows: Vec<Vec<String>>,
    pub column_count: usize,
}

impl Grid {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse a raw payload. Bytes that are not valid UTF-8 are rejected whole;
/// no partial grid is returned.
pub fn parse_bytes(payload: &[u8]) -> Result<Grid, FvError> {
    let text = std::str::from_utf8(payload).map_err(|_| FvError::InvalidInput)?;
    Ok(parse(text))
}

/// Parse delimited text into a grid. Never fails for string input; malformed
/// data degrades into best-effort cells instead.
///
/// A field is either quoted (`""` decodes to one literal quote, separators
/// and newlines appear verbatim inside) or unquoted, running to the next
/// comma, CR, LF or end of input. A record ends at CR, LF, CRLF or end of
/// input. A trailing newline produces no extra empty row; a blank line
/// produces a one-cell row holding the empty string.
pub fn parse(text: &str) -> Grid {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut column_count = 0;

    let mut chars = text.chars().peekable();
    while chars.peek().is_some() {
        let (cell, end) = scan_field(&mut chars);
        row.push(cell);
        match end {
            FieldEnd::Separator => {}
            FieldEnd::Record => {
                column_count = column_count.max(row.len());
                rows.push(std::mem::take(&mut row));
            }
            FieldEnd::Input => break,
        }
    }
    if !row.is_empty() {
        column_count = column_count.max(row.len());
        rows.push(row);
    }

    trace!("Parsed {} rows, widest row {}", rows.len(), column_count);
    Grid { rows, column_count }
}

enum FieldEnd {
    Separator,
    Record,
    Input,
}

fn scan_field(chars: &mut Peekable<Chars>) -> (String, FieldEnd) {
    let mut cell = String::new();

    if chars.peek() == Some(&'"') {
        chars.next();
        loop {
            match chars.next() {
                Some('"') => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        cell.push('"');
                    } else {
                        break;
                    }
                }
                Some(c) => cell.push(c),
                // Unterminated quote: keep what we have.
                None => return (cell, FieldEnd::Input),
            }
        }
    }

    // Unquoted remainder, which also picks up anything trailing a closing
    // quote, until the next separator or record end.
    loop {
        match chars.peek().copied() {
            Some(',') => {
                chars.next();
                return (cell, FieldEnd::Separator);
            }
            Some('\r') => {
                chars.next();
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                return (cell, FieldEnd::Record);
            }
            Some('\n') => {
                chars.next();
                return (cell, FieldEnd::Record);
            }
            Some(c) => {
                chars.next();
                cell.push(c);
            }
            None => return (cell, FieldEnd::Input),
        }
    }
}
