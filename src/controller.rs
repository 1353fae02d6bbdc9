use tracing::{info, warn};

use crate::chart;
use crate::domain::{FileKind, FvError, Message};
use crate::host::{Content, HeaderControl, PreviewHost, SheetConverter, TableSnapshot};
use crate::model::TableView;
use crate::parser;

/// One preview session per opened file. The session owns its view state and
/// its host handle; concurrent previews each construct their own session,
/// and everything is discarded when the preview closes.
pub struct PreviewSession<H: PreviewHost> {
    host: H,
    name: String,
    view: Option<TableView>,
}

impl<H: PreviewHost> PreviewSession<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            name: String::new(),
            view: None,
        }
    }

    /// Route a fetched payload to its handler. The handler set is closed;
    /// unknown extensions fail here instead of being silently ignored.
    pub fn open(
        &mut self,
        name: &str,
        payload: &[u8],
        converter: Option<&dyn SheetConverter>,
    ) -> Result<(), FvError> {
        let kind = FileKind::detect(name)?;
        self.name = name.to_string();
        self.view = None;
        info!("Opening {:?} preview for {}", kind, name);

        match kind {
            FileKind::Csv => match parser::parse_bytes(payload) {
                Ok(grid) => self.install_view(TableView::new(grid)),
                Err(e) => {
                    self.host
                        .set_content(Content::Error(format!("Error loading CSV: {e}")));
                }
            },
            FileKind::Excel => match converter {
                Some(converter) => match converter.convert(payload) {
                    Ok(text) => self.install_view(TableView::new(parser::parse(&text))),
                    Err(e) => self.host.show_warning(&e.to_string()),
                },
                None => self
                    .host
                    .show_warning("No spreadsheet converter is available."),
            },
            FileKind::Text => {
                self.host
                    .set_content(Content::Text(String::from_utf8_lossy(payload).into_owned()));
            }
            FileKind::Pdf | FileKind::Image => {
                // Native rendering is the host's business.
                self.host.set_content(Content::Media {
                    kind,
                    bytes: payload.to_vec(),
                });
            }
        }
        Ok(())
    }

    fn install_view(&mut self, view: TableView) {
        self.host.add_header_control(HeaderControl::FilterInput);
        self.host.add_header_control(HeaderControl::ExportButton);
        self.host.add_header_control(HeaderControl::ChartButton);
        self.host
            .add_header_control(HeaderControl::ColumnMenu(view.headers().to_vec()));
        self.view = Some(view);
        self.refresh();
    }

    /// Apply one user action and push the resulting state to the host.
    pub fn handle(&mut self, message: Message) {
        if self.view.is_none() {
            warn!("Dropping {:?}: no tabular view is open", message);
            return;
        }
        match message {
            Message::Export => {
                if let Some(view) = &self.view {
                    let filename = export_name(&self.name);
                    self.host.offer_download(&filename, &view.export_text());
                }
            }
            Message::Chart(label_col, value_col) => {
                if let Some(view) = &self.view {
                    let content =
                        match chart::build_series(&view.displayed_rows(), label_col, value_col) {
                            Ok(series) => Content::Chart(series),
                            Err(e) => Content::Notice(e.to_string()),
                        };
                    self.host.set_content(content);
                }
            }
            message => {
                if let Some(view) = self.view.as_mut() {
                    view.update(&message);
                }
                self.refresh();
            }
        }
    }

    fn refresh(&mut self) {
        if let Some(view) = &self.view {
            self.host.set_content(Content::Table(TableSnapshot {
                name: self.name.clone(),
                projection: view.project(),
                footer: view.footer(),
            }));
        }
    }

    pub fn view(&self) -> Option<&TableView> {
        self.view.as_ref()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }
}

fn export_name(name: &str) -> String {
    if name.to_lowercase().ends_with(".csv") {
        name.to_string()
    } else {
        format!("{name}.csv")
    }
}
