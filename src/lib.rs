//! fv — in-page file-download preview core.
//!
//! The heart of the crate is the tabular data engine: a tolerant
//! delimited-text parser ([`parse`]) and a mutable view over the parsed grid
//! ([`TableView`]) with free-text filtering, numeric-aware sorting, column
//! visibility, per-column aggregation, CSV export and chart hand-off. The
//! surrounding plumbing (file-type dispatch, host interfaces, a preview
//! session) is intentionally thin; the page chrome itself belongs to an
//! external presentation host.

pub mod chart;
pub mod controller;
pub mod domain;
pub mod host;
pub mod model;
pub mod parser;
pub mod render;
pub mod stats;

pub use chart::{ChartSeries, build_series};
pub use controller::PreviewSession;
pub use domain::{FileKind, FvConfig, FvError, Message, SortDirection};
pub use host::{Content, HeaderControl, PreviewHost, SheetConverter, TableSnapshot};
pub use model::{Projection, TableView};
pub use parser::{Grid, parse, parse_bytes};
pub use stats::ColumnSummary;
