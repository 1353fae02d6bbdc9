use std::path::Path;

use derive_setters::Setters;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FvError {
    #[error("Invalid input: payload is not text.")]
    InvalidInput,
    #[error("No numeric data found for selected columns.")]
    EmptySeries,
    #[error("Spreadsheet conversion failed: {0}")]
    ConversionFailure(String),
    #[error("Unknown file type")]
    UnknownFileType,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// User actions a preview session understands. `Filter`, `Sort` and
/// `ToggleColumn` mutate view state; `Export` and `Chart` read the current
/// view without touching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Filter(String),
    Sort(usize),
    ToggleColumn(usize, bool),
    Export,
    Chart(usize, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// The closed set of file types a preview session can handle. Dispatch is
/// explicit pattern matching; there is no open-ended handler registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Excel,
    Pdf,
    Image,
    Text,
}

impl FileKind {
    pub fn detect(name: &str) -> Result<FileKind, FvError> {
        match Path::new(name)
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
            .as_deref()
        {
            Some("CSV") => Ok(FileKind::Csv),
            Some("XLSX") | Some("XLS") => Ok(FileKind::Excel),
            Some("PDF") => Ok(FileKind::Pdf),
            Some("PNG") | Some("JPG") | Some("JPEG") | Some("GIF") | Some("WEBP") => {
                Ok(FileKind::Image)
            }
            Some("TXT") | Some("LOG") | Some("MD") | Some("JSON") | Some("XML") | Some("JS")
            | Some("PY") | Some("RS") => Ok(FileKind::Text),
            _ => Err(FvError::UnknownFileType),
        }
    }
}

/// Rendering knobs for the text renderer and console host.
#[derive(Debug, Clone, Setters)]
pub struct FvConfig {
    /// Rendered columns are capped at this width; longer values are truncated.
    pub max_column_width: usize,
    /// Rendered tables are cut off after this many body rows.
    pub max_render_rows: usize,
}

impl Default for FvConfig {
    fn default() -> Self {
        Self {
            max_column_width: 32,
            max_render_rows: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_known_extensions() {
        assert_eq!(FileKind::detect("report.csv").unwrap(), FileKind::Csv);
        assert_eq!(FileKind::detect("report.CSV").unwrap(), FileKind::Csv);
        assert_eq!(FileKind::detect("book.xlsx").unwrap(), FileKind::Excel);
        assert_eq!(FileKind::detect("scan.pdf").unwrap(), FileKind::Pdf);
        assert_eq!(FileKind::detect("photo.JPG").unwrap(), FileKind::Image);
        assert_eq!(FileKind::detect("notes.txt").unwrap(), FileKind::Text);
    }

    #[test]
    fn detect_rejects_unknown() {
        assert!(matches!(
            FileKind::detect("archive.zip"),
            Err(FvError::UnknownFileType)
        ));
        assert!(matches!(
            FileKind::detect("no_extension"),
            Err(FvError::UnknownFileType)
        ));
    }

    #[test]
    fn sort_direction_flips() {
        assert_eq!(SortDirection::Ascending.flip(), SortDirection::Descending);
        assert_eq!(SortDirection::Descending.flip(), SortDirection::Ascending);
    }
}
