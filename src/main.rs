use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use arboard::Clipboard;
use clap::Parser;
use tracing::{info, trace};
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use fv::chart::ChartSeries;
use fv::controller::PreviewSession;
use fv::domain::{FvConfig, Message};
use fv::host::{Content, HeaderControl, PreviewHost};
use fv::render;

/// Preview a downloadable file in the terminal: tabular data gets the full
/// filter/sort/column-visibility treatment, everything else a best-effort
/// pass-through.
#[derive(Debug, Parser)]
#[command(name = "fv", version, about = "File download previewer")]
struct Cli {
    /// File to preview (~ and $VARS are expanded)
    path: String,

    /// Keep only rows where any cell contains this text (case-insensitive)
    #[arg(long)]
    filter: Option<String>,

    /// Sort by this column index; repeat the same index to flip direction
    #[arg(long)]
    sort: Vec<usize>,

    /// Hide this column index (repeatable)
    #[arg(long)]
    hide: Vec<usize>,

    /// Write the current view as CSV to this path
    #[arg(long)]
    export: Option<PathBuf>,

    /// Copy the current view as CSV to the clipboard
    #[arg(long)]
    copy: bool,

    /// Build a chart series from a label and a value column
    #[arg(long, num_args = 2, value_names = ["LABEL_COL", "VALUE_COL"])]
    chart: Option<Vec<usize>>,

    /// Cap rendered column width
    #[arg(long, default_value_t = 32)]
    max_column_width: usize,

    /// Cap rendered row count
    #[arg(long, default_value_t = 500)]
    max_rows: usize,
}

/// Console rendition of the presentation host: remembers the latest content
/// pass and the export payload, printed once all actions are applied.
#[derive(Default)]
struct ConsoleHost {
    latest: Option<Content>,
    export: Option<String>,
}

impl PreviewHost for ConsoleHost {
    fn set_content(&mut self, content: Content) {
        self.latest = Some(content);
    }

    fn add_header_control(&mut self, control: HeaderControl) {
        // No chrome on a console; the controls map to CLI flags instead.
        trace!("Host control requested: {:?}", control);
    }

    fn offer_download(&mut self, filename: &str, payload: &str) {
        trace!("Download offered as {}", filename);
        self.export = Some(payload.to_string());
    }

    fn show_warning(&mut self, message: &str) {
        eprintln!("Warning: {message}");
    }
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(ErrorLayer::default())
        .init();

    let cli = Cli::parse();
    let config = FvConfig::default()
        .max_column_width(cli.max_column_width)
        .max_render_rows(cli.max_rows);

    let path = shellexpand::full(&cli.path)
        .with_context(|| format!("expanding {}", cli.path))?
        .into_owned();
    let payload = fs::read(&path).with_context(|| format!("reading {path}"))?;
    let name = Path::new(&path)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.clone());

    let mut session = PreviewSession::new(ConsoleHost::default());
    session.open(&name, &payload, None)?;

    if let Some(query) = &cli.filter {
        session.handle(Message::Filter(query.clone()));
    }
    for col in &cli.sort {
        session.handle(Message::Sort(*col));
    }
    for col in &cli.hide {
        session.handle(Message::ToggleColumn(*col, false));
    }
    if let Some(axes) = &cli.chart {
        session.handle(Message::Chart(axes[0], axes[1]));
    }
    if cli.export.is_some() || cli.copy {
        session.handle(Message::Export);
    }

    let host = session.into_host();
    if let Some(content) = &host.latest {
        print_content(content, &config);
    }

    if let Some(payload) = host.export {
        if let Some(out) = &cli.export {
            fs::write(out, &payload)
                .with_context(|| format!("writing {}", out.display()))?;
            info!("Exported view to {}", out.display());
        }
        if cli.copy {
            match Clipboard::new().and_then(|mut cb| cb.set_text(payload)) {
                Ok(_) => trace!("Copied view to clipboard."),
                Err(e) => eprintln!("Warning: clipboard unavailable: {e}"),
            }
        }
    }

    Ok(())
}

fn print_content(content: &Content, config: &FvConfig) {
    match content {
        Content::Table(snapshot) => println!("{}", render::render_table(snapshot, config)),
        Content::Text(text) => println!("{text}"),
        Content::Chart(series) => print_series(series),
        Content::Media { kind, bytes } => {
            println!("[{kind:?} payload, {} bytes: delegated to a native viewer]", bytes.len());
        }
        Content::Notice(message) => println!("{message}"),
        Content::Error(message) => eprintln!("{message}"),
    }
}

// Minimal horizontal bar chart, one line per point.
fn print_series(series: &ChartSeries) {
    let max = series
        .values
        .iter()
        .cloned()
        .fold(1.0_f64, f64::max);
    for (label, value) in series.labels.iter().zip(&series.values) {
        let bar = ((value / max) * 40.0).round().max(0.0) as usize;
        println!("{label:>16}  {value:>12}  {}", "#".repeat(bar));
    }
}
