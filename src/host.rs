//! Interfaces to the excluded collaborators: the presentation host that owns
//! the page chrome, and the spreadsheet-binary converter.

use crate::chart::ChartSeries;
use crate::domain::{FileKind, FvError};
use crate::model::Projection;
use crate::stats::ColumnSummary;

/// Everything a host needs to render one tabular preview pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot {
    pub name: String,
    pub projection: Projection,
    /// One entry per visible column, in ascending column order.
    pub footer: Vec<(usize, Option<ColumnSummary>)>,
}

/// Content handed to the host's content slot. User-visible failures travel
/// through here as `Error`/`Notice` instead of crashing the hosting page.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Table(TableSnapshot),
    Text(String),
    Chart(ChartSeries),
    /// Payloads the host displays natively (PDF tab, image zoom).
    Media { kind: FileKind, bytes: Vec<u8> },
    Notice(String),
    Error(String),
}

/// Header controls a tabular preview asks its host to offer. The host owns
/// the actual widgets and wires interaction back as `Message`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderControl {
    FilterInput,
    ExportButton,
    ChartButton,
    ColumnMenu(Vec<String>),
}

/// The presentation host: a content slot, header-control slots, a download
/// hand-off and a warning surface. The core never touches page chrome
/// beyond this.
pub trait PreviewHost {
    fn set_content(&mut self, content: Content);
    fn add_header_control(&mut self, control: HeaderControl);
    fn offer_download(&mut self, filename: &str, payload: &str);
    fn show_warning(&mut self, message: &str);
}

/// Spreadsheet binary payload to delimited text. The conversion itself is an
/// external concern; failures surface as warnings and the core never sees
/// partially converted data.
pub trait SheetConverter {
    fn convert(&self, payload: &[u8]) -> Result<String, FvError>;
}
